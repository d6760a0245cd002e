//! Configuration structures for the statement pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StmtError};

/// Main configuration for the stmtx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtxConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Statement extraction configuration.
    pub extraction: ExtractionConfig,

    /// Export sink configuration.
    pub export: ExportConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider PDF as text-based.
    pub min_text_length: usize,

    /// Decode the raw file bytes when the PDF libraries yield no text.
    pub raw_fallback: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            min_text_length: 50,
            raw_fallback: true,
        }
    }
}

/// Statement extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Earliest year accepted for summary dates.
    pub min_year: i32,

    /// Latest year accepted for summary dates.
    pub max_year: i32,

    /// Characters searched before a label when looking for its amount.
    pub label_window_before: usize,

    /// Characters searched after a label when looking for its amount.
    pub label_window_after: usize,

    /// Assign categories to transactions.
    pub categorize: bool,

    /// Currency used when none is detected.
    pub default_currency: String,

    /// Days a transaction may fall outside the statement period before a warning.
    pub period_tolerance_days: i64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_year: 2020,
            max_year: 2100,
            label_window_before: 100,
            label_window_after: 250,
            categorize: true,
            default_currency: "INR".to_string(),
            period_tolerance_days: 7,
        }
    }
}

/// Output file names and formatting for the export sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// JSON output file name.
    pub json_file: String,

    /// Statement-level CSV file name.
    pub csv_file: String,

    /// Transaction-level CSV file name.
    pub transactions_csv_file: String,

    /// SQLite database file name.
    pub db_file: String,

    /// Pretty-print JSON output.
    pub pretty_json: bool,

    /// Also write the transaction-level CSV.
    pub write_transactions_csv: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            json_file: "results.json".to_string(),
            csv_file: "results.csv".to_string(),
            transactions_csv_file: "results_transactions.csv".to_string(),
            db_file: "results.db".to_string(),
            pretty_json: true,
            write_transactions_csv: true,
        }
    }
}

impl StmtxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| StmtError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| StmtError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the export file paths inside `dir`.
    pub fn export_paths(&self, dir: &Path) -> ExportPaths {
        ExportPaths {
            json: dir.join(&self.export.json_file),
            csv: dir.join(&self.export.csv_file),
            transactions_csv: self
                .export
                .write_transactions_csv
                .then(|| dir.join(&self.export.transactions_csv_file)),
            db: dir.join(&self.export.db_file),
        }
    }
}

/// Concrete output locations for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub transactions_csv: Option<PathBuf>,
    pub db: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StmtxConfig =
            serde_json::from_str(r#"{"extraction": {"min_year": 2015}}"#).unwrap();
        assert_eq!(config.extraction.min_year, 2015);
        assert_eq!(config.extraction.max_year, 2100);
        assert_eq!(config.export.json_file, "results.json");
        assert!(config.pdf.raw_fallback);
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = StmtxConfig::default();
        config.export.db_file = "statements.db".to_string();
        config.save(&path).unwrap();

        let loaded = StmtxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.export.db_file, "statements.db");
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(StmtxConfig::from_file(&path), Err(StmtError::Config(_))));
    }

    #[test]
    fn test_export_paths() {
        let mut config = StmtxConfig::default();
        let paths = config.export_paths(Path::new("out"));
        assert_eq!(paths.json, Path::new("out").join("results.json"));
        assert!(paths.transactions_csv.is_some());

        config.export.write_transactions_csv = false;
        assert!(config.export_paths(Path::new("out")).transactions_csv.is_none());
    }
}
