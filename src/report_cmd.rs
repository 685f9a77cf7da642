//! Report command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use apiusage::output::{generate_execution_id, output_json, JsonResponse, RunSummaryResponse};
use apiusage::{FactSource, FileSink, IngestStats, OutputFormat, ReportConfig, ResultAggregator};

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Canceled,
}

pub fn run_report(
    config: ReportConfig,
    facts: Vec<PathBuf>,
    output_format: OutputFormat,
) -> Result<RunOutcome> {
    // Create shutdown flag
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    // Register signal handlers for SIGINT and SIGTERM
    #[cfg(unix)]
    {
        use signal_hook::consts::signal;
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([signal::SIGTERM, signal::SIGINT])?;

        std::thread::spawn(move || {
            let mut received = signals.forever();
            if received.next().is_some() {
                tracing::info!("interrupt received, finishing report");
                shutdown_clone.store(true, Ordering::SeqCst);
            }
            // A second signal terminates the process like an unhandled one.
            if let Some(signal) = received.next() {
                let _ = signal_hook::low_level::emulate_default_handler(signal);
            }
        });
    }

    // Resolve inputs before anything is written
    let sources = facts
        .iter()
        .map(|path| FactSource::resolve(path))
        .collect::<Result<Vec<_>>>()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let output_path = config.output_path();
    if output_format == OutputFormat::Human {
        println!("Writing report to {}", output_path.display());
    }

    let (stats, summary) = runtime.block_on(async {
        let aggregator = Arc::new(ResultAggregator::new(
            config.subject_name.clone(),
            FileSink::new(&output_path),
            config.debounce,
        )?);
        tracing::info!(
            subject = %config.subject_name,
            producers = sources.len(),
            debounce_ms = config.debounce.as_millis() as u64,
            "report started"
        );

        let producers: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let aggregator = Arc::clone(&aggregator);
                let shutdown = Arc::clone(&shutdown);
                tokio::task::spawn_blocking(move || {
                    let stats = source
                        .read(&shutdown, |fact| Ok(aggregator.enqueue(fact)?))
                        .with_context(|| format!("Failed to read facts from {}", source.label()));
                    (source.label(), stats)
                })
            })
            .collect();

        // Every producer is drained before completing, even after a failure,
        // so the final report holds everything that was read.
        let mut stats = IngestStats::default();
        let mut first_error: Option<anyhow::Error> = None;
        for producer in producers {
            match producer.await {
                Ok((label, Ok(source_stats))) => {
                    tracing::debug!(source = %label, facts = source_stats.facts, "producer finished");
                    stats.merge(source_stats);
                }
                Ok((_, Err(e))) => {
                    first_error.get_or_insert(e);
                }
                Err(join_error) => {
                    first_error.get_or_insert(anyhow::anyhow!("Producer task failed: {}", join_error));
                }
            }
        }

        let summary = aggregator.complete().await?;
        if let Some(e) = first_error {
            return Err(e);
        }
        Ok::<_, anyhow::Error>((stats, summary))
    })?;

    let canceled = stats.interrupted || shutdown.load(Ordering::SeqCst);
    let mut response = RunSummaryResponse::new(
        &config.subject_name,
        &output_path.display().to_string(),
        stats,
        summary,
    );
    response.canceled = canceled;

    match output_format {
        OutputFormat::Human => {
            if canceled {
                println!("Analysis canceled.");
            } else {
                println!("Analysis complete.");
            }
            response.print_human();
        }
        OutputFormat::Json => {
            let execution_id = generate_execution_id();
            let json = JsonResponse::new(response, &execution_id).with_partial(canceled);
            output_json(&json)?;
        }
    }

    Ok(if canceled {
        RunOutcome::Canceled
    } else {
        RunOutcome::Completed
    })
}
