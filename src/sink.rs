//! Destinations for rendered reports.
//!
//! Every publish carries a complete document. [`FileSink`] replaces the target
//! file atomically so readers never see a partially written report.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives each complete rendered document.
pub trait ReportSink: Send {
    fn publish(&mut self, document: &str) -> Result<()>;
}

impl<F> ReportSink for F
where
    F: FnMut(&str) -> Result<()> + Send,
{
    fn publish(&mut self, document: &str) -> Result<()> {
        (self)(document)
    }
}

/// Writes each document over a file via write-to-temp and rename.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    last_hash: Option<String>,
    writes: usize,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_hash: None,
            writes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the file was actually rewritten.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Compute SHA-256 hash of a document
    fn compute_hash(document: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(document.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn replace_file(&self, document: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        temp.write_all(document.as_bytes())
            .context("Failed to write report contents")?;
        temp.flush()?;
        temp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl ReportSink for FileSink {
    fn publish(&mut self, document: &str) -> Result<()> {
        let hash = Self::compute_hash(document);
        if self.last_hash.as_deref() == Some(hash.as_str()) {
            tracing::debug!(path = %self.path.display(), "report unchanged, skipping write");
            return Ok(());
        }

        self.replace_file(document)?;
        self.last_hash = Some(hash);
        self.writes += 1;
        tracing::debug!(path = %self.path.display(), bytes = document.len(), "report written");
        Ok(())
    }
}
