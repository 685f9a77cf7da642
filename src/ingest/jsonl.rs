//! JSON Lines fact decoding.
//!
//! One [`Fact`] per line. Blank lines are skipped; lines that fail to decode
//! are logged and counted but never abort the read.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::facts::Fact;

/// Counters for one read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Facts decoded and handed on
    pub facts: usize,
    /// Non-blank lines that did not decode
    pub malformed: usize,
    /// Whether the read stopped early because of a shutdown request
    pub interrupted: bool,
}

impl IngestStats {
    pub fn merge(&mut self, other: IngestStats) {
        self.facts += other.facts;
        self.malformed += other.malformed;
        self.interrupted |= other.interrupted;
    }
}

/// Decode one line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> serde_json::Result<Option<Fact>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Read facts from `reader` until EOF or until `shutdown` is set.
///
/// `origin` names the input in log messages. `emit` receives every decoded
/// fact in input order; its error ends the read.
pub fn read_facts<R, F>(reader: R, origin: &str, shutdown: &AtomicBool, emit: F) -> Result<IngestStats>
where
    R: BufRead,
    F: FnMut(Fact) -> Result<()>,
{
    decode_lines(reader.lines(), origin, shutdown, emit)
}

/// Decode facts from a sequence of lines until it ends or `shutdown` is set.
///
/// A sequence that ends while `shutdown` is set counts as interrupted.
pub fn decode_lines<I, F>(
    lines: I,
    origin: &str,
    shutdown: &AtomicBool,
    mut emit: F,
) -> Result<IngestStats>
where
    I: IntoIterator<Item = io::Result<String>>,
    F: FnMut(Fact) -> Result<()>,
{
    let mut stats = IngestStats::default();
    let mut lines = lines.into_iter().enumerate();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            stats.interrupted = true;
            break;
        }
        let Some((index, line)) = lines.next() else {
            stats.interrupted = shutdown.load(Ordering::SeqCst);
            break;
        };

        let line = line.with_context(|| format!("Failed to read {}", origin))?;
        match parse_line(&line) {
            Ok(Some(fact)) => {
                emit(fact)?;
                stats.facts += 1;
            }
            Ok(None) => {}
            Err(e) => {
                stats.malformed += 1;
                tracing::warn!(origin, line = index + 1, "skipping malformed fact: {}", e);
            }
        }
    }

    Ok(stats)
}
