//! Translation-unit dumps
//!
//! Reads the JSON event streams an external AST walker writes, one `*.tu.json`
//! file per translation unit.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::FrontEnd;
use super::events::TranslationUnit;
use crate::error::IndexError;

pub const DUMP_SUFFIX: &str = ".tu.json";

#[derive(Debug, Clone, Default)]
pub struct JsonDumpFrontEnd;

impl JsonDumpFrontEnd {
    pub fn new() -> Self {
        Self
    }

    /// Every dump under `dir`, sorted for a deterministic schedule
    pub fn discover(dir: &Path) -> Vec<PathBuf> {
        let mut dumps: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(DUMP_SUFFIX))
            .map(|entry| entry.into_path())
            .collect();
        dumps.sort();
        debug!("Discovered {} dumps under {}", dumps.len(), dir.display());
        dumps
    }
}

impl FrontEnd for JsonDumpFrontEnd {
    fn parse(&self, dump: &Path) -> Result<TranslationUnit, IndexError> {
        let raw = std::fs::read_to_string(dump).map_err(|e| IndexError::FrontEnd {
            path: dump.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| IndexError::FrontEnd {
            path: dump.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_finds_nested_dumps() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let nested = temp_dir.path().join("lib");
        fs::create_dir(&nested)?;
        fs::write(temp_dir.path().join("main.tu.json"), "{}")?;
        fs::write(nested.join("util.tu.json"), "{}")?;
        fs::write(nested.join("notes.json"), "{}")?;

        let dumps = JsonDumpFrontEnd::discover(temp_dir.path());
        assert_eq!(
            dumps,
            vec![nested.join("util.tu.json"), temp_dir.path().join("main.tu.json")]
        );
        Ok(())
    }

    #[test]
    fn test_parse_dump() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let dump = temp_dir.path().join("main.tu.json");
        fs::write(&dump, r#"{"path": "/src/main.cc"}"#)?;

        let tu = JsonDumpFrontEnd::new().parse(&dump).unwrap();
        assert_eq!(tu.path, PathBuf::from("/src/main.cc"));
        assert!(tu.events.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_reports_malformed_dump() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let dump = temp_dir.path().join("broken.tu.json");
        fs::write(&dump, "{ not json")?;

        match JsonDumpFrontEnd::new().parse(&dump) {
            Err(IndexError::FrontEnd { path, .. }) => assert_eq!(path, dump),
            other => panic!("expected front end error, got {other:?}"),
        }
        Ok(())
    }
}
