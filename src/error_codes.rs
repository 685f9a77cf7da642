//! apiusage error codes
//!
//! Error codes follow the pattern: USG-{CATEGORY}-{3-digit number}
//!
//! Categories (1-3 uppercase letters):
//! - Q: Queue and processor contract errors (enqueue after completion, double completion)
//! - P: Processing errors (callback or sink failure, panicked processing task)
//! - K: Document writer errors (dangling property, misplaced blank line, unbalanced nodes)
//! - RT: Runtime errors (no async runtime available)
//!
//! Each error code is stable and should not be reused.
//!
//! # Queue Errors (USG-Q-*)
//!
//! | Code | Description | Remediation |
//! |------|-------------|-------------|
//! | USG-Q-001 | Enqueue after completion | Stop all producers before calling `complete()` |
//! | USG-Q-002 | Completed twice | Call `complete()` exactly once per run |
//!
//! # Processing Errors (USG-P-*)
//!
//! | Code | Description | Remediation |
//! |------|-------------|-------------|
//! | USG-P-001 | Processing failed | Check the sink target (permissions, disk space) |
//! | USG-P-002 | Processing task panicked | Bug; report with the logged panic message |
//!
//! # Writer Errors (USG-K-*)
//!
//! | Code | Description | Remediation |
//! |------|-------------|-------------|
//! | USG-K-001 | Incomplete property | Write a value right after every property name |
//! | USG-K-002 | Blank line mid-line | Only request blank lines after a node is closed |
//! | USG-K-003 | Formatter failed | The target `fmt::Write` rejected output |
//! | USG-K-004 | Unbalanced nodes | Pair every `start_node` with one `end_node` |
//!
//! # Runtime Errors (USG-RT-*)
//!
//! | Code | Description | Remediation |
//! |------|-------------|-------------|
//! | USG-RT-001 | No runtime | Construct the aggregator inside a tokio runtime |

/// Items were enqueued after completion was requested
pub const USG_Q_001_ENQUEUE_AFTER_COMPLETE: &str = "USG-Q-001";

/// Completion was requested more than once
pub const USG_Q_002_ALREADY_COMPLETED: &str = "USG-Q-002";

/// The processing callback (or the sink it feeds) returned an error
pub const USG_P_001_PROCESSING_FAILED: &str = "USG-P-001";

/// The processing task panicked or was aborted
pub const USG_P_002_TASK_PANICKED: &str = "USG-P-002";

/// A property name was written without its value
pub const USG_K_001_INCOMPLETE_PROPERTY: &str = "USG-K-001";

/// A blank line was requested in the middle of a line
pub const USG_K_002_BLANK_LINE_MID_LINE: &str = "USG-K-002";

/// The underlying formatter failed
pub const USG_K_003_FORMAT_FAILED: &str = "USG-K-003";

/// Node starts and ends do not balance
pub const USG_K_004_UNBALANCED_NODES: &str = "USG-K-004";

/// A component was created outside of a tokio runtime
pub const USG_RT_001_NO_RUNTIME: &str = "USG-RT-001";

#[cfg(test)]
mod tests {
    use super::*;

    fn all_codes() -> Vec<&'static str> {
        vec![
            USG_Q_001_ENQUEUE_AFTER_COMPLETE,
            USG_Q_002_ALREADY_COMPLETED,
            USG_P_001_PROCESSING_FAILED,
            USG_P_002_TASK_PANICKED,
            USG_K_001_INCOMPLETE_PROPERTY,
            USG_K_002_BLANK_LINE_MID_LINE,
            USG_K_003_FORMAT_FAILED,
            USG_K_004_UNBALANCED_NODES,
            USG_RT_001_NO_RUNTIME,
        ]
    }

    #[test]
    fn test_error_codes_are_unique() {
        let mut unique = std::collections::HashSet::new();
        for code in all_codes() {
            assert!(unique.insert(code), "Duplicate error code detected: {}", code);
        }
    }

    #[test]
    fn test_error_code_format() {
        for code in all_codes() {
            // Format: USG-{CATEGORY}-{3-digit number}
            assert!(code.starts_with("USG-"), "Error code must start with 'USG-': {}", code);
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "Error code must have 3 parts: {}", code);

            assert!(
                !parts[1].is_empty() && parts[1].len() <= 3,
                "Category must be 1-3 chars: {}",
                code
            );
            assert!(parts[1].chars().all(|c| c.is_ascii_uppercase()));

            assert_eq!(parts[2].len(), 3, "Number must be 3 digits: {}", code);
            assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
