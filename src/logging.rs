//! Tracing setup for the indexer binary

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_ENV: &str = "XREF_LOG_FILE";
pub const LOG_UNIQUE_ENV: &str = "XREF_LOG_UNIQUE";
pub const LOG_JSON_ENV: &str = "XREF_LOG_JSON";

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "cxx_xref_indexer::consumer=trace"
    pub level: String,
    /// Log file path; stderr when unset
    pub file_path: Option<PathBuf>,
    /// Emit one JSON object per event
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create LogConfig from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_true = |var: &str| lookup(var).is_some_and(|v| v == "true");
        let level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let file_path = lookup(LOG_FILE_ENV).map(|path| {
            let path = PathBuf::from(path);
            if is_true(LOG_UNIQUE_ENV) {
                with_pid_suffix(&path, std::process::id())
            } else {
                path
            }
        });

        Self {
            level,
            file_path,
            json_format: is_true(LOG_JSON_ENV),
        }
    }

    /// Override values from CLI arguments
    pub fn with_overrides(mut self, level: Option<String>, file_path: Option<PathBuf>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(file_path) = file_path {
            self.file_path = Some(file_path);
        }
        self
    }
}

/// `index.log` -> `index.<pid>.log`, so parallel runs don't share a file
fn with_pid_suffix(path: &Path, pid: u32) -> PathBuf {
    let Some(stem) = path.file_stem() else {
        return path.to_path_buf();
    };
    let stem = stem.to_string_lossy();
    let file_name = match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, pid, ext.to_string_lossy()),
        None => format!("{stem}.{pid}"),
    };
    path.with_file_name(file_name)
}

/// Initialize the logging system based on configuration
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match (&config.file_path, config.json_format) {
        (Some(file_path), json) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            if json {
                subscriber
                    .with(fmt::layer().json().with_writer(file).with_ansi(false))
                    .init();
            } else {
                subscriber
                    .with(
                        fmt::layer()
                            .with_writer(file)
                            .with_ansi(false)
                            .with_target(true)
                            .with_thread_ids(true)
                            .with_line_number(true),
                    )
                    .init();
            }
        }
        (None, true) => {
            subscriber
                .with(fmt::layer().json().with_writer(io::stderr).with_ansi(false))
                .init();
        }
        (None, false) => {
            subscriber
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(true)
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();
        }
    }

    Ok(())
}

/// Log how long an operation took
#[macro_export]
macro_rules! log_timing {
    ($level:expr, $operation:expr, $duration:expr) => {
        tracing::event!(
            $level,
            operation = $operation,
            duration_ms = $duration.as_millis(),
            pid = std::process::id(),
            "Performance timing"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> LogConfig {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        LogConfig::from_lookup(|var| vars.get(var).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]), LogConfig::default());
    }

    #[test]
    fn test_unique_file_name() {
        let config = config_from(&[(LOG_FILE_ENV, "/tmp/xref.log"), (LOG_UNIQUE_ENV, "true")]);
        let expected = format!("/tmp/xref.{}.log", std::process::id());
        assert_eq!(config.file_path, Some(PathBuf::from(expected)));

        assert_eq!(
            with_pid_suffix(Path::new("/var/log/xref"), 42),
            PathBuf::from("/var/log/xref.42")
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[("RUST_LOG", "warn"), (LOG_JSON_ENV, "true")])
            .with_overrides(Some("trace".to_string()), Some(PathBuf::from("run.log")));
        assert_eq!(config.level, "trace");
        assert_eq!(config.file_path, Some(PathBuf::from("run.log")));
        assert!(config.json_format);
    }
}
