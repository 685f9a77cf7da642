//! Output module for CLI commands
//!
//! Provides schema-versioned JSON and human-readable run summaries.

pub mod command;

pub use command::{
    generate_execution_id, output_json, JsonResponse, OutputFormat, RunSummaryResponse,
};
