//! Run configuration for one report.

use std::path::PathBuf;
use std::time::Duration;

/// File extension of the rendered report.
pub const REPORT_EXTENSION: &str = "kdl";

/// Default delay between a burst of facts and the report rewrite it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// Report configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Name of the library whose API usage is reported
    pub subject_name: String,
    /// Directory the report is written to
    pub output_dir: PathBuf,
    /// Debounce interval of report rewrites
    pub debounce: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            subject_name: String::new(),
            output_dir: PathBuf::from("."),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ReportConfig {
    pub fn new(subject_name: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            ..Self::default()
        }
    }

    /// `<output_dir>/<subject_name>.kdl`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.subject_name, REPORT_EXTENSION))
    }
}
