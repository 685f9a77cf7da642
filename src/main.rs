//! apiusage CLI - live API usage report for a library
//!
//! Usage: apiusage report <SUBJECT> [arguments]

mod cli;
mod report_cmd;

use apiusage::{KdlError, PipelineError};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{parse_args, print_usage, Command};
use report_cmd::RunOutcome;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "APIUSAGE_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Stable error code of the first coded error in the chain, if any.
fn error_code(error: &anyhow::Error) -> Option<&'static str> {
    error.chain().find_map(|cause| {
        cause
            .downcast_ref::<PipelineError>()
            .map(PipelineError::code)
            .or_else(|| cause.downcast_ref::<KdlError>().map(KdlError::code))
    })
}

fn report_error(error: &anyhow::Error) {
    match error_code(error) {
        Some(code) => eprintln!("Error [{}]: {:#}", code, error),
        None => eprintln!("Error: {:#}", error),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let command = match parse_args() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::from(1);
        }
    };

    match command {
        Command::Report {
            config,
            facts,
            output_format,
        } => match report_cmd::run_report(config, facts, output_format) {
            Ok(RunOutcome::Completed) => ExitCode::SUCCESS,
            Ok(RunOutcome::Canceled) => ExitCode::from(1),
            Err(e) => {
                report_error(&e);
                ExitCode::from(1)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_found_in_chain() {
        let error = anyhow::Error::new(PipelineError::AlreadyCompleted).context("finishing report");
        assert_eq!(error_code(&error), Some("USG-Q-002"));

        let error = anyhow::anyhow!("plain failure");
        assert_eq!(error_code(&error), None);
    }
}
