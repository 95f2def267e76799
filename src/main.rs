mod config;
mod consumer;
mod database;
mod driver;
mod error;
mod frontend;
mod index;
mod indexer;
mod io;
mod logging;
mod symbol;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use config::IndexerConfig;
use database::SymbolDatabase;
use frontend::JsonDumpFrontEnd;
use io::RealFileSystem;
use logging::{LogConfig, init_logging};
use symbol::Usr;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// CLI arguments for the cross-reference indexer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `*.tu.json` translation-unit dumps (defaults to current directory)
    #[arg(long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Directory for the merged per-file indexes (overrides XREF_OUTPUT_DIR env var)
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Concurrent indexing jobs (overrides XREF_JOBS env var)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Pretty-print emitted JSON
    #[arg(long)]
    pretty: bool,

    /// Log level (overrides RUST_LOG env var)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log file path (overrides XREF_LOG_FILE env var)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// After indexing, print a JSON report for this USR (string or hash); repeatable
    #[arg(long, value_name = "USR")]
    query: Vec<String>,
}

/// Accept either a raw USR string or its already-hashed decimal form
fn parse_query(raw: &str) -> Usr {
    raw.parse::<u64>()
        .map(Usr)
        .unwrap_or_else(|_| Usr::from_usr_string(raw))
}

fn print_reports(database: &SymbolDatabase, queries: &[String]) {
    for raw in queries {
        let report = database.report(parse_query(raw));
        if report.records.is_empty() {
            warn!("No records for {}", raw);
        }
        match serde_json::to_string(&report) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("Failed to render report for {}: {}", raw, e),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_config = LogConfig::from_env().with_overrides(args.log_level, args.log_file);
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match IndexerConfig::from_env() {
        Ok(config) => config.with_overrides(args.input, args.output, args.jobs, args.pretty),
        Err(e) => {
            error!("Invalid environment: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Starting indexer with {:?}", config);

    let dumps = JsonDumpFrontEnd::discover(&config.input_dir);
    if dumps.is_empty() {
        warn!("No translation-unit dumps under {}", config.input_dir.display());
    }

    let (database, summary) =
        match driver::index_all(dumps, Arc::new(JsonDumpFrontEnd::new()), RealFileSystem, config.jobs)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!("Indexing aborted: {}", e);
                return ExitCode::FAILURE;
            }
        };

    if database.is_empty() {
        warn!("No file indexes were produced");
    }
    if let Err(e) = database.write_to(&config.output_dir, config.pretty) {
        error!("Failed to write indexes to {}: {}", config.output_dir.display(), e);
        return ExitCode::FAILURE;
    }

    print_reports(&database, &args.query);

    for (unit, reason) in &summary.failed {
        warn!("Skipped {}: {}", unit.display(), reason);
    }
    info!(
        "Done: {} indexed, {} failed, {} events recorded",
        summary.indexed.len(),
        summary.failed.len(),
        summary.stats.recorded
    );

    if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
