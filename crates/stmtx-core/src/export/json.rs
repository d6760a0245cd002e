//! JSON array sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Result, ResultSink};
use crate::models::statement::ParseOutcome;

/// Writes all outcomes as one JSON array.
pub struct JsonSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl ResultSink for JsonSink {
    fn write(&mut self, outcomes: &[ParseOutcome]) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, outcomes)?;
        } else {
            serde_json::to_writer(&mut writer, outcomes)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!("Wrote {} outcomes to {}", outcomes.len(), self.path.display());
        Ok(())
    }
}
