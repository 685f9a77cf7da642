//! apiusage: a live, deterministic API usage report
//!
//! Producers discover three kinds of facts concurrently (where the current API
//! surface came from, which APIs exist, and where they are referenced) and hand
//! them to a [`ResultAggregator`]. The aggregator batches them with a debounce,
//! recomputes the unused / removed / used partition, and rewrites a KDL report
//! in full after every batch.
//!
//! # Determinism
//!
//! Rendering is a pure function of the facts received so far. Every grouping is
//! ordered by ordinal string comparison, so an unchanged state always produces
//! a byte-identical document.
//!
//! # Layers
//!
//! - [`pipeline`]: auto-reset event, debouncer and delayed batch processor
//! - [`report`]: aggregate state, partition, document layout
//! - [`kdl`]: streaming KDL writer
//! - [`sink`]: where rendered documents go

pub mod config;
pub mod error;
pub mod error_codes;
pub mod facts;
pub mod ingest;
pub mod kdl;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod version;

pub use config::{ReportConfig, DEFAULT_DEBOUNCE, REPORT_EXTENSION};
pub use error::PipelineError;
pub use facts::{DiscoveredApi, DiscoveredApiDeclarationSource, DiscoveredReference, Fact};
pub use ingest::{FactSource, IngestStats};
pub use kdl::{KdlError, KdlWriter};
pub use output::{generate_execution_id, output_json, JsonResponse, OutputFormat};
pub use pipeline::{AutoResetEvent, Debouncer, DelayedProcessor};
pub use report::{render_report, ReportState, ReportSummary, ResultAggregator};
pub use sink::{FileSink, ReportSink};
