//! Live API usage report.
//!
//! [`ResultAggregator`] accepts facts from any number of producers, batches
//! them through a [`DelayedProcessor`], and after every batch renders the full
//! report and publishes it to a [`ReportSink`].

pub mod render;
pub mod state;

pub use render::{render_report, GENERATED_SOURCE_REFERENCE};
pub use state::{Partition, ReportState};

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::error::PipelineError;
use crate::facts::Fact;
use crate::pipeline::DelayedProcessor;
use crate::sink::ReportSink;

/// Partition sizes of the final state and how many documents were published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub unused_api_count: usize,
    pub removed_api_count: usize,
    pub used_api_count: usize,
    pub documents_published: usize,
}

impl ReportSummary {
    fn of(state: &ReportState, documents_published: usize) -> Self {
        let partition = state.partition();
        Self {
            unused_api_count: partition.unused.len(),
            removed_api_count: partition.removed.len(),
            used_api_count: partition.used.len(),
            documents_published,
        }
    }
}

/// State owned by the processing task.
///
/// Only the batch callback touches it while the run is live; the mutex exists
/// so `complete` can read the final summary once the task has finished.
struct Compiler {
    subject_name: String,
    state: ReportState,
    sink: Box<dyn ReportSink>,
    documents_published: usize,
}

impl Compiler {
    fn ingest_and_compile(&mut self, batch: Vec<Fact>) -> anyhow::Result<()> {
        let facts = batch.len();
        self.state.ingest(batch);

        let document = render_report(&self.subject_name, &self.state)?;
        tracing::debug!(facts, bytes = document.len(), "rendered report");

        self.sink.publish(&document)?;
        self.documents_published += 1;
        Ok(())
    }
}

/// Aggregates facts and keeps the published report current.
pub struct ResultAggregator {
    processor: DelayedProcessor<Fact>,
    compiler: Arc<Mutex<Compiler>>,
}

impl ResultAggregator {
    /// Create the aggregator. Must be called inside a tokio runtime.
    ///
    /// `debounce` is the delay between the first fact of a quiet period and
    /// the render it triggers.
    pub fn new<S>(
        subject_name: impl Into<String>,
        sink: S,
        debounce: Duration,
    ) -> Result<Self, PipelineError>
    where
        S: ReportSink + 'static,
    {
        let compiler = Arc::new(Mutex::new(Compiler {
            subject_name: subject_name.into(),
            state: ReportState::new(),
            sink: Box::new(sink),
            documents_published: 0,
        }));

        let processor = {
            let compiler = Arc::clone(&compiler);
            DelayedProcessor::new(
                move |batch: Vec<Fact>| {
                    compiler
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .ingest_and_compile(batch)
                },
                debounce,
            )?
        };

        Ok(Self {
            processor,
            compiler,
        })
    }

    /// Queue one fact. Never blocks on rendering.
    pub fn enqueue(&self, fact: impl Into<Fact>) -> Result<(), PipelineError> {
        self.processor.enqueue([fact.into()])
    }

    /// Queue several facts, kept contiguous and in order.
    pub fn enqueue_all<I>(&self, facts: I) -> Result<(), PipelineError>
    where
        I: IntoIterator<Item = Fact>,
    {
        self.processor.enqueue(facts)
    }

    /// Flush the last batch, publish the final report and return its summary.
    pub async fn complete(&self) -> Result<ReportSummary, PipelineError> {
        self.processor.complete().await?;

        let compiler = self.compiler.lock().unwrap_or_else(PoisonError::into_inner);
        let summary = ReportSummary::of(&compiler.state, compiler.documents_published);
        tracing::info!(
            unused = summary.unused_api_count,
            removed = summary.removed_api_count,
            used = summary.used_api_count,
            documents = summary.documents_published,
            "report complete"
        );
        Ok(summary)
    }
}
