use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::metrics::ActivityRecord;

pub const HEADER: [&str; 5] = [
    "timestamp",
    "x_position",
    "y_position",
    "distance_moved",
    "idle_time",
];

/// Append-only CSV file of activity records.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Makes sure the file exists and starts with the header row. Existing
    /// contents are never rewritten, so calling this again is harmless.
    pub fn ensure_initialized(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory {}", dir.display()))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log file {}", self.path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("Failed to stat {}", self.path.display()))?
            .len();

        if len > 0 {
            log::info!("Appending to existing log file at {}", self.path.display());
            return Ok(());
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(HEADER)
            .context("Failed to write CSV header")?;
        writer.flush().context("Failed to flush CSV header")?;

        log::info!("Created new log file at {}", self.path.display());
        Ok(())
    }

    /// The file must already exist; a log removed while running is an error
    /// rather than a headerless new file.
    pub fn append(&self, record: &ActivityRecord) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log file {}", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        writer
            .serialize(record)
            .context("Failed to write activity record")?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;

        Ok(())
    }
}
