use anyhow::Context;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::LogBuffer;

/// URL buffer backed by an append-only text file.
///
/// The buffer counts as closed once [`LogBuffer::close`] was called, a write
/// failed, or the file was removed from disk (e.g. by log rotation).
pub struct FileLogBuffer {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileLogBuffer {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open URL buffer {}", path.display()))?;
        writeln!(
            file,
            "-- URL buffer (urltitel v{}) opened {} --",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        tracing::debug!(path = %path.display(), "URL buffer opened");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(Some(file)),
        })
    }
}

impl LogBuffer for FileLogBuffer {
    fn is_open(&self) -> bool {
        let guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        guard.is_some() && self.path.exists()
    }

    fn print(&self, line: &str) -> anyhow::Result<()> {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = guard
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("URL buffer is closed"))?;
        let stamp = chrono::Local::now().format("%H:%M:%S");
        if let Err(e) = writeln!(file, "{stamp}\t{line}") {
            *guard = None;
            return Err(e).context("Failed to write URL buffer");
        }
        Ok(())
    }

    fn close(&self) {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}
