//! Append-only CSV dataset writer.
//!
//! Rows are flushed as soon as they are written: samples arrive seconds
//! apart, and a crash must not lose the tail of a multi-hour run.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::record::{SampleRecord, CSV_HEADER};

pub struct DatasetWriter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    rows_written: AtomicU64,
}

impl DatasetWriter {
    /// Open (or create) the dataset at `path`. The header is written only
    /// when the file is new or empty, so interrupted runs can be resumed by
    /// appending to the same file.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let fresh = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);

        if fresh {
            writeln!(writer, "{CSV_HEADER}")?;
            writer.flush()?;
            log::info!("created dataset file {}", path.display());
        } else {
            log::info!("appending to existing dataset file {}", path.display());
        }

        Ok(Self {
            writer: Mutex::new(writer),
            path: path.to_path_buf(),
            rows_written: AtomicU64::new(0),
        })
    }

    /// Append one row and flush it to disk.
    pub fn append(&self, record: &SampleRecord) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", record.to_csv_row())?;
        writer.flush()?;
        self.rows_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Rows written by this writer instance (not counting pre-existing rows).
    pub fn rows_written(&self) -> u64 {
        self.rows_written.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
