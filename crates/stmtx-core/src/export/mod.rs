//! Export sinks for parse outcomes.
//!
//! Every sink writes one statement record per outcome, parsed or failed.

mod csv;
mod json;
mod sqlite;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::sqlite::SqliteSink;

use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::models::config::{ExportPaths, StmtxConfig};
use crate::models::statement::ParseOutcome;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Destination for a batch of outcomes.
pub trait ResultSink {
    /// Write all outcomes.
    fn write(&mut self, outcomes: &[ParseOutcome]) -> Result<()>;
}

/// Write JSON, CSV and SQLite outputs into `out_dir`.
pub fn export_all(
    outcomes: &[ParseOutcome],
    config: &StmtxConfig,
    out_dir: &Path,
) -> Result<ExportPaths> {
    std::fs::create_dir_all(out_dir)?;
    let paths = config.export_paths(out_dir);

    JsonSink::new(&paths.json)
        .with_pretty(config.export.pretty_json)
        .write(outcomes)?;

    let mut csv = CsvSink::new(&paths.csv);
    if let Some(path) = &paths.transactions_csv {
        csv = csv.with_transactions(path);
    }
    csv.write(outcomes)?;

    SqliteSink::new(&paths.db).write(outcomes)?;

    info!(
        "Exported {} outcomes to {}",
        outcomes.len(),
        out_dir.display()
    );
    Ok(paths)
}

/// Display form of an optional value, empty when absent.
pub(crate) fn opt_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
