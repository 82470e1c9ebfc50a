//! Append-only CSV log of readings.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::constants::CSV_HEADER;
use crate::reading::Reading;

/// CSV writer that always starts with the fixed header row.
///
/// Each row is flushed as soon as it is written so an abrupt exit loses at
/// most the reading in flight.
pub struct CsvLog<W: Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl CsvLog<File> {
    /// Create (or truncate) the log file at `path`.
    ///
    /// The parent directory is not created; a missing directory is an error.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!(
                    "Output directory {} does not exist",
                    parent.display()
                );
            }
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        Self::new(file).with_context(|| format!("Failed to write header to {}", path.display()))
    }
}

impl<W: Write> CsvLog<W> {
    /// Wrap `inner` and write the header row.
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Append one row.
    pub fn append(&mut self, reading: &Reading) -> Result<()> {
        self.writer
            .serialize(reading)
            .context("Failed to write reading to log")?;
        self.writer.flush().context("Failed to flush log")?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows written after the header.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush log: {}", e.error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn contents(log: CsvLog<Vec<u8>>) -> String {
        String::from_utf8(log.finish().expect("finish failed")).unwrap()
    }

    #[test]
    fn test_header_without_rows() {
        let log = CsvLog::new(Vec::new()).unwrap();
        assert_eq!(log.rows(), 0);
        assert_eq!(contents(log), "Timestamp (s),Angle (deg)\n");
    }

    #[test]
    fn test_rows_follow_header() {
        let mut log = CsvLog::new(Vec::new()).unwrap();
        log.append(&Reading::new(0.123_456, 12.5)).unwrap();
        log.append(&Reading::new(1.5, -3.25)).unwrap();
        assert_eq!(log.rows(), 2);
        assert_eq!(
            contents(log),
            "Timestamp (s),Angle (deg)\n0.12346,12.5\n1.5,-3.25\n"
        );
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("angle_log.csv");
        std::fs::write(&path, "old,contents\n1,2\n3,4\n").unwrap();

        let mut log = CsvLog::create(&path).unwrap();
        log.append(&Reading::new(0.0, 90.0)).unwrap();
        drop(log);

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Timestamp (s),Angle (deg)\n0.0,90.0\n");
    }

    #[test]
    fn test_rows_are_flushed_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("live.csv");
        let mut log = CsvLog::create(&path).unwrap();
        log.append(&Reading::new(0.25, 1.0)).unwrap();

        // Still open, but the row must already be on disk.
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
        drop(log);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("wifi_angle_log.csv");
        let err = CsvLog::create(&path).err().expect("create should fail");
        assert!(err.to_string().contains("does not exist"));
        assert!(!path.parent().unwrap().exists());
    }
}
