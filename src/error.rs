//! Error types for the batching pipeline.
//!
//! Contract violations (enqueue after completion, completing twice) are
//! programming errors and are reported, never retried. Processing failures
//! are carried to whoever awaits completion.

use crate::error_codes::*;

/// Errors raised by the debounced batching pipeline and the aggregator on top of it.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// `enqueue` was called after `complete` had been requested
    #[error("enqueue must not be called after complete has been called")]
    EnqueueAfterComplete,

    /// `complete` was called more than once
    #[error("complete must not be called more than once")]
    AlreadyCompleted,

    /// The processing callback returned an error; the loop stopped without retrying
    #[error("batch processing failed: {0:#}")]
    Processing(#[source] anyhow::Error),

    /// The processing task panicked or was aborted
    #[error("processing task terminated abnormally: {0}")]
    TaskPanicked(String),

    /// A pipeline component was created outside of a tokio runtime
    #[error("no tokio runtime is available to drive the pipeline")]
    NoRuntime,
}

impl PipelineError {
    /// Stable error code for this error (see [`crate::error_codes`]).
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::EnqueueAfterComplete => USG_Q_001_ENQUEUE_AFTER_COMPLETE,
            PipelineError::AlreadyCompleted => USG_Q_002_ALREADY_COMPLETED,
            PipelineError::Processing(_) => USG_P_001_PROCESSING_FAILED,
            PipelineError::TaskPanicked(_) => USG_P_002_TASK_PANICKED,
            PipelineError::NoRuntime => USG_RT_001_NO_RUNTIME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_error_keeps_source_chain() {
        let err = PipelineError::Processing(
            anyhow::anyhow!("disk full").context("writing report"),
        );

        assert_eq!(err.code(), "USG-P-001");
        assert_eq!(err.to_string(), "batch processing failed: writing report: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_contract_errors_have_distinct_codes() {
        assert_ne!(
            PipelineError::EnqueueAfterComplete.code(),
            PipelineError::AlreadyCompleted.code()
        );
    }
}
