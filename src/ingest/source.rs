//! Fact inputs named on the command line.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use super::jsonl::{decode_lines, read_facts, IngestStats};
use crate::facts::Fact;

/// File extension of fact files picked up from directories.
pub const FACTS_EXTENSION: &str = "jsonl";

/// One producer's worth of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactSource {
    /// Standard input (`-`)
    Stdin,
    /// A single file
    File(PathBuf),
    /// Every `*.jsonl` file below a directory, in sorted path order
    Directory { root: PathBuf, files: Vec<PathBuf> },
}

impl FactSource {
    /// Resolve a command-line path. Directories are expanded eagerly.
    pub fn resolve(path: &Path) -> Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(FactSource::Stdin);
        }

        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Cannot access facts path {}", path.display()))?;
        if !metadata.is_dir() {
            return Ok(FactSource::File(path.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| p.extension().is_some_and(|ext| ext == FACTS_EXTENSION))
            .collect();
        files.sort();

        Ok(FactSource::Directory {
            root: path.to_path_buf(),
            files,
        })
    }

    /// Name used in logs.
    pub fn label(&self) -> String {
        match self {
            FactSource::Stdin => "<stdin>".to_string(),
            FactSource::File(path) => path.display().to_string(),
            FactSource::Directory { root, .. } => root.display().to_string(),
        }
    }

    /// Read every fact of this source in order. Blocking.
    pub fn read<F>(&self, shutdown: &AtomicBool, mut emit: F) -> Result<IngestStats>
    where
        F: FnMut(Fact) -> Result<()>,
    {
        match self {
            FactSource::Stdin => {
                let lines = DetachedLines::spawn(BufReader::new(io::stdin()), shutdown)?;
                decode_lines(lines, "<stdin>", shutdown, emit)
            }
            FactSource::File(path) => read_file(path, shutdown, emit),
            FactSource::Directory { files, .. } => {
                let mut total = IngestStats::default();
                for file in files {
                    let stats = read_file(file, shutdown, &mut emit)?;
                    total.merge(stats);
                    if total.interrupted {
                        break;
                    }
                }
                Ok(total)
            }
        }
    }
}

fn read_file<F>(path: &Path, shutdown: &AtomicBool, emit: F) -> Result<IngestStats>
where
    F: FnMut(Fact) -> Result<()>,
{
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let origin = path.display().to_string();
    let stats = read_facts(BufReader::new(file), &origin, shutdown, emit)?;
    tracing::debug!(origin, facts = stats.facts, malformed = stats.malformed, "read facts file");
    Ok(stats)
}

/// How often a producer waiting for input re-checks the shutdown flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lines read ahead before the reader thread waits for the consumer.
const LINE_BUFFER: usize = 1024;

/// Lines read on a helper thread.
///
/// The consumer stops waiting as soon as shutdown is requested. The helper
/// thread stays blocked in `read` until its input closes or the process exits.
struct DetachedLines<'a> {
    receiver: Receiver<io::Result<String>>,
    shutdown: &'a AtomicBool,
}

impl<'a> DetachedLines<'a> {
    fn spawn<R>(reader: R, shutdown: &'a AtomicBool) -> Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(LINE_BUFFER);
        std::thread::Builder::new()
            .name("apiusage-input".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
            })
            .context("Failed to start input reader thread")?;

        Ok(Self { receiver, shutdown })
    }
}

impl Iterator for DetachedLines<'_> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return None;
            }
            match self.receiver.recv_timeout(SHUTDOWN_POLL_INTERVAL) {
                Ok(line) => return Some(line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}
