//! Output types for the `report` command
//!
//! The run summary is printed either as human-readable text or as a
//! schema-versioned JSON document.

use serde::{Deserialize, Serialize};

use crate::ingest::IngestStats;
use crate::report::ReportSummary;

/// Current JSON output schema version
pub const APIUSAGE_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Wrapper for all JSON responses
///
/// Every JSON response includes schema_version and execution_id for
/// parsing stability and traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// Schema version for parsing stability
    pub schema_version: String,
    /// Unique execution ID for this run
    pub execution_id: String,
    /// Response data
    pub data: T,
    /// Whether the response is partial (run was canceled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<bool>,
}

impl<T> JsonResponse<T> {
    /// Create a new JSON response
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: APIUSAGE_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            data,
            partial: None,
        }
    }

    /// Mark the response as partial
    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = Some(partial);
        self
    }
}

/// Summary of one `report` run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummaryResponse {
    /// Library the report is about
    pub subject: String,
    /// Path of the written report
    pub output_path: String,
    /// Facts read from all inputs
    pub facts_read: usize,
    /// Input lines skipped because they did not decode
    pub malformed_lines: usize,
    /// APIs declared but never referenced
    pub unused_api_count: usize,
    /// Referenced APIs that are no longer declared
    pub removed_api_count: usize,
    /// Referenced APIs that are still declared
    pub used_api_count: usize,
    /// Times the report was rendered and published
    pub documents_published: usize,
    /// Whether the run was canceled before all input was read
    pub canceled: bool,
}

impl RunSummaryResponse {
    pub fn new(subject: &str, output_path: &str, ingest: IngestStats, report: ReportSummary) -> Self {
        Self {
            subject: subject.to_string(),
            output_path: output_path.to_string(),
            facts_read: ingest.facts,
            malformed_lines: ingest.malformed,
            unused_api_count: report.unused_api_count,
            removed_api_count: report.removed_api_count,
            used_api_count: report.used_api_count,
            documents_published: report.documents_published,
            canceled: ingest.interrupted,
        }
    }

    /// Print the summary in human-readable form
    pub fn print_human(&self) {
        println!("Report: {}", self.output_path);
        println!("  Facts read:        {}", self.facts_read);
        if self.malformed_lines > 0 {
            println!("  Malformed lines:   {}", self.malformed_lines);
        }
        println!("  Unused APIs:       {}", self.unused_api_count);
        println!("  Removed APIs:      {}", self.removed_api_count);
        println!("  Used APIs:         {}", self.used_api_count);
        println!("  Report updates:    {}", self.documents_published);
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Human,
    /// JSON output with schema versioning
    Json,
}

impl OutputFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Generate a unique execution ID for this run
///
/// Uses timestamp + process ID for uniqueness.
pub fn generate_execution_id() -> String {
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let pid = process::id();

    format!("{:x}-{:x}", timestamp, pid)
}

/// Output JSON to stdout
pub fn output_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}
