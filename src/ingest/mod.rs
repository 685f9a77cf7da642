//! Fact ingestion for the command-line driver.
//!
//! The analysis that discovers APIs and references runs elsewhere and hands
//! its results over as JSON Lines; each input is drained by one producer.

pub mod jsonl;
pub mod source;

pub use jsonl::{decode_lines, parse_line, read_facts, IngestStats};
pub use source::{FactSource, FACTS_EXTENSION};
