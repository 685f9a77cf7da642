//! CLI argument parsing for apiusage
//!
//! Defines the Command enum and parse_args() function.

use anyhow::Result;
use apiusage::{OutputFormat, ReportConfig};
use std::path::PathBuf;
use std::time::Duration;

pub fn print_usage() {
    eprintln!("apiusage - Live API usage report for a library");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  apiusage report <SUBJECT> [--facts <PATH>]... [--debounce-ms <N>] [--output-dir <DIR>] [--output <FORMAT>]");
    eprintln!("  apiusage --help");
    eprintln!("  apiusage --version");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  report          Aggregate discovered facts into <SUBJECT>.kdl, rewritten as facts arrive");
    eprintln!();
    eprintln!("Report arguments:");
    eprintln!("  <SUBJECT>           Name of the library whose API usage is reported");
    eprintln!("  --facts <PATH>      JSON Lines facts: a file, a directory of *.jsonl files, or - for stdin");
    eprintln!("                      (repeatable; each path is read concurrently; default: -)");
    eprintln!("  --debounce-ms <N>   Delay before the report is rewritten (default: 5000)");
    eprintln!("  --output-dir <DIR>  Directory the report is written to (default: .)");
    eprintln!("  --output <FORMAT>   Summary format: human (default) or json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  APIUSAGE_LOG        Log filter, e.g. debug or apiusage=info (default: warn)");
}

pub enum Command {
    Report {
        config: ReportConfig,
        facts: Vec<PathBuf>,
        output_format: OutputFormat,
    },
}

/// Parse CLI arguments into a Command
///
/// `args` includes the program name. For the --version and -V flags, it
/// prints the version and exits. For the --help and -h flags, it prints
/// usage and exits.
pub fn parse_args_impl<F>(args: &[String], print_version: F) -> Result<Command>
where
    F: FnOnce(),
{
    if args.len() < 2 {
        return Err(anyhow::anyhow!("Missing command"));
    }

    let command = &args[1];

    // Handle --version and -V flags
    if command == "--version" || command == "-V" {
        print_version();
        std::process::exit(0);
    }

    // Handle --help and -h flags
    if command == "--help" || command == "-h" {
        print_usage();
        std::process::exit(0);
    }

    match command.as_str() {
        "report" => {
            let mut subject_name: Option<String> = None;
            let mut facts: Vec<PathBuf> = Vec::new();
            let mut config = ReportConfig::default();
            let mut output_format = OutputFormat::Human;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--facts" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--facts requires an argument"));
                        }
                        facts.push(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--debounce-ms" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--debounce-ms requires an argument"));
                        }
                        let debounce_ms: u64 = args[i + 1].parse().map_err(|_| {
                            anyhow::anyhow!("Invalid --debounce-ms value: {}", args[i + 1])
                        })?;
                        config.debounce = Duration::from_millis(debounce_ms);
                        i += 2;
                    }
                    "--output-dir" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--output-dir requires an argument"));
                        }
                        config.output_dir = PathBuf::from(&args[i + 1]);
                        i += 2;
                    }
                    "--output" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--output requires an argument"));
                        }
                        output_format = OutputFormat::from_str(&args[i + 1]).ok_or_else(|| {
                            anyhow::anyhow!(
                                "Invalid output format: {}. Must be human or json",
                                args[i + 1]
                            )
                        })?;
                        i += 2;
                    }
                    arg if arg.starts_with("--") => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", arg));
                    }
                    arg => {
                        if subject_name.is_some() {
                            return Err(anyhow::anyhow!("Unexpected argument: {}", arg));
                        }
                        subject_name = Some(arg.to_string());
                        i += 1;
                    }
                }
            }

            config.subject_name =
                subject_name.ok_or_else(|| anyhow::anyhow!("<SUBJECT> is required"))?;
            if config.subject_name.is_empty() {
                return Err(anyhow::anyhow!("<SUBJECT> must not be empty"));
            }

            if facts.is_empty() {
                facts.push(PathBuf::from("-"));
            }

            Ok(Command::Report {
                config,
                facts,
                output_format,
            })
        }
        _ => Err(anyhow::anyhow!("Unknown command: {}", command)),
    }
}

/// Convenience wrapper around parse_args_impl that reads the process
/// arguments and uses the version module
pub fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_impl(&args, || {
        println!("{}", apiusage::version::version());
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        let args: Vec<String> = std::iter::once("apiusage")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        parse_args_impl(&args, || {})
    }

    #[test]
    fn test_report_defaults() {
        let Command::Report {
            config,
            facts,
            output_format,
        } = parse(&["report", "Contoso.Widgets"]).unwrap();

        assert_eq!(config.subject_name, "Contoso.Widgets");
        assert_eq!(config.debounce, Duration::from_secs(5));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(facts, vec![PathBuf::from("-")]);
        assert_eq!(output_format, OutputFormat::Human);
    }

    #[test]
    fn test_report_all_flags() {
        let Command::Report {
            config,
            facts,
            output_format,
        } = parse(&[
            "report",
            "--facts",
            "a.jsonl",
            "Lib",
            "--facts",
            "dir",
            "--debounce-ms",
            "250",
            "--output-dir",
            "out",
            "--output",
            "json",
        ])
        .unwrap();

        assert_eq!(config.subject_name, "Lib");
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.output_path(), PathBuf::from("out/Lib.kdl"));
        assert_eq!(facts, vec![PathBuf::from("a.jsonl"), PathBuf::from("dir")]);
        assert_eq!(output_format, OutputFormat::Json);
    }

    #[test]
    fn test_report_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["report"]).is_err());
        assert!(parse(&["report", "Lib", "Other"]).is_err());
        assert!(parse(&["report", "Lib", "--facts"]).is_err());
        assert!(parse(&["report", "Lib", "--debounce-ms", "soon"]).is_err());
        assert!(parse(&["report", "Lib", "--output", "xml"]).is_err());
        assert!(parse(&["report", "Lib", "--verbose"]).is_err());
        assert!(parse(&["status"]).is_err());
    }
}
