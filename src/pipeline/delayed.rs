//! Debounced batch processor.
//!
//! Producers append items under a short lock; a single background task owns
//! the processing callback and is the only place it is ever invoked, so
//! batches never overlap. Each invocation runs on tokio's blocking pool.
//!
//! # Wakeups
//!
//! - `enqueue` signals the [`Debouncer`], whose action sets the [`AutoResetEvent`]
//!   one debounce interval later
//! - `complete` sets the event directly so the final drain is not delayed
//!
//! On each wake the loop drains the whole buffer (items enqueued while a batch
//! is being processed land in the next batch) and exits after the drain that
//! observed completion, even when that drain was empty.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::auto_reset::AutoResetEvent;
use super::debouncer::Debouncer;
use crate::error::PipelineError;

struct Queue<T> {
    items: Vec<T>,
    completed: bool,
}

struct Shared<T> {
    queue: Mutex<Queue<T>>,
    wake: AutoResetEvent,
}

impl<T> Shared<T> {
    fn lock(&self) -> std::sync::MutexGuard<'_, Queue<T>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot and clear the buffer, noting whether completion was requested.
    fn drain(&self) -> (Vec<T>, bool) {
        let mut queue = self.lock();
        (std::mem::take(&mut queue.items), queue.completed)
    }
}

/// Batches enqueued items and hands them, in enqueue order, to one sequential
/// processing callback after a debounce interval.
pub struct DelayedProcessor<T> {
    shared: Arc<Shared<T>>,
    debouncer: Debouncer,
    run: Mutex<Option<JoinHandle<Result<(), PipelineError>>>>,
}

impl<T: Send + 'static> DelayedProcessor<T> {
    /// Start the processing task.
    ///
    /// `process` receives every non-empty batch. Returning an error stops the
    /// loop; the error is reported by [`DelayedProcessor::complete`].
    pub fn new<F>(process: F, debounce_interval: Duration) -> Result<Self, PipelineError>
    where
        F: FnMut(Vec<T>) -> anyhow::Result<()> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                items: Vec::new(),
                completed: false,
            }),
            wake: AutoResetEvent::new(),
        });

        let debouncer = {
            let shared = Arc::clone(&shared);
            Debouncer::new(debounce_interval, move || shared.wake.set())?
        };

        let run = tokio::spawn(run_loop(Arc::clone(&shared), process));

        Ok(Self {
            shared,
            debouncer,
            run: Mutex::new(Some(run)),
        })
    }

    /// Append items to the buffer. Never suspends.
    pub fn enqueue<I>(&self, items: I) -> Result<(), PipelineError>
    where
        I: IntoIterator<Item = T>,
    {
        {
            let mut queue = self.shared.lock();
            if queue.completed {
                return Err(PipelineError::EnqueueAfterComplete);
            }
            queue.items.extend(items);
        }

        self.debouncer.signal();
        Ok(())
    }

    /// Whether completion has been requested.
    pub fn is_completed(&self) -> bool {
        self.shared.lock().completed
    }

    /// Request shutdown and wait until every item enqueued so far has been
    /// processed, then release the debounce timer.
    ///
    /// Fails if called twice, or with the processing error if a batch failed.
    pub async fn complete(&self) -> Result<(), PipelineError> {
        {
            let mut queue = self.shared.lock();
            if queue.completed {
                return Err(PipelineError::AlreadyCompleted);
            }
            queue.completed = true;
        }

        self.shared.wake.set();

        let run = self.run.lock().unwrap_or_else(PoisonError::into_inner).take();
        let outcome = match run {
            Some(run) => match run.await {
                Ok(result) => result,
                Err(join_error) => Err(PipelineError::TaskPanicked(join_error.to_string())),
            },
            None => Ok(()),
        };

        self.debouncer.shutdown().await;
        outcome
    }
}

impl<T> Drop for DelayedProcessor<T> {
    fn drop(&mut self) {
        if let Some(run) = self
            .run
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            run.abort();
        }
    }
}

async fn run_loop<T, F>(shared: Arc<Shared<T>>, mut process: F) -> Result<(), PipelineError>
where
    T: Send + 'static,
    F: FnMut(Vec<T>) -> anyhow::Result<()> + Send + 'static,
{
    loop {
        shared.wake.wait().await;

        let (batch, is_last) = shared.drain();

        if !batch.is_empty() {
            let len = batch.len();
            // The callback renders and writes files; it runs on the blocking pool.
            let (returned, outcome) = tokio::task::spawn_blocking(move || {
                let outcome = process(batch);
                (process, outcome)
            })
            .await
            .map_err(|join_error| PipelineError::TaskPanicked(join_error.to_string()))?;
            process = returned;

            if let Err(e) = outcome {
                tracing::error!(items = len, "batch processing failed: {:#}", e);
                return Err(PipelineError::Processing(e));
            }
            tracing::debug!(items = len, "processed batch");
        }

        if is_last {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Batches = Arc<Mutex<Vec<Vec<u32>>>>;

    fn recording_processor(debounce: Duration) -> (DelayedProcessor<u32>, Batches) {
        let batches: Batches = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&batches);
        let processor = DelayedProcessor::new(
            move |batch: Vec<u32>| {
                sink.lock().unwrap().push(batch);
                Ok(())
            },
            debounce,
        )
        .unwrap();
        (processor, batches)
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_are_batched_after_debounce() {
        let (processor, batches) = recording_processor(Duration::from_secs(5));

        processor.enqueue([1, 2]).unwrap();
        processor.enqueue([3]).unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(batches.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*batches.lock().unwrap(), vec![vec![1, 2, 3]]);

        processor.enqueue([4]).unwrap();
        processor.complete().await.unwrap();
        assert_eq!(*batches.lock().unwrap(), vec![vec![1, 2, 3], vec![4]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_flushes_without_waiting_for_debounce() {
        let (processor, batches) = recording_processor(Duration::from_secs(3600));

        processor.enqueue(0..5).unwrap();
        let started = tokio::time::Instant::now();
        processor.complete().await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(*batches.lock().unwrap(), vec![vec![0, 1, 2, 3, 4]]);
    }

    #[tokio::test]
    async fn test_complete_with_nothing_enqueued_terminates() {
        let (processor, batches) = recording_processor(Duration::from_millis(10));
        processor.complete().await.unwrap();
        assert!(batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enqueue_after_complete_fails() {
        let (processor, _) = recording_processor(Duration::from_millis(10));
        processor.complete().await.unwrap();

        assert!(processor.is_completed());
        assert!(matches!(
            processor.enqueue([1]),
            Err(PipelineError::EnqueueAfterComplete)
        ));
    }

    #[tokio::test]
    async fn test_complete_twice_fails() {
        let (processor, _) = recording_processor(Duration::from_millis(10));
        processor.complete().await.unwrap();
        assert!(matches!(
            processor.complete().await,
            Err(PipelineError::AlreadyCompleted)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_lose_nothing_and_keep_order() {
        let (processor, batches) = recording_processor(Duration::from_millis(2));
        let processor = Arc::new(processor);

        let producers: Vec<_> = (0..4u32)
            .map(|producer| {
                let processor = Arc::clone(&processor);
                tokio::spawn(async move {
                    for i in 0..250u32 {
                        processor.enqueue([producer * 1000 + i]).unwrap();
                        if i % 50 == 0 {
                            tokio::time::sleep(Duration::from_millis(3)).await;
                        }
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        processor.complete().await.unwrap();

        let batches = batches.lock().unwrap();
        assert!(batches.iter().all(|batch| !batch.is_empty()));
        let delivered: Vec<u32> = batches.iter().flatten().copied().collect();
        assert_eq!(delivered.len(), 1000);

        // Per-producer order survives batching.
        for producer in 0..4u32 {
            let own: Vec<u32> = delivered
                .iter()
                .copied()
                .filter(|v| v / 1000 == producer)
                .collect();
            let expected: Vec<u32> = (0..250).map(|i| producer * 1000 + i).collect();
            assert_eq!(own, expected);
        }
    }

    #[tokio::test]
    async fn test_callback_runs_off_the_async_thread() {
        let caller = std::thread::current().id();
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let processor = DelayedProcessor::new(
            move |_batch: Vec<u32>| {
                *record.lock().unwrap() = Some(std::thread::current().id());
                Ok(())
            },
            Duration::from_millis(10),
        )
        .unwrap();

        processor.enqueue([1]).unwrap();
        processor.complete().await.unwrap();

        let seen = seen.lock().unwrap().expect("callback never ran");
        assert_ne!(seen, caller);
    }

    #[tokio::test]
    async fn test_processing_error_surfaces_on_complete() {
        let processor = DelayedProcessor::new(
            |_batch: Vec<u32>| Err(anyhow::anyhow!("sink unavailable")),
            Duration::from_millis(10),
        )
        .unwrap();

        processor.enqueue([1]).unwrap();
        let err = processor.complete().await.unwrap_err();

        assert!(matches!(err, PipelineError::Processing(_)));
        assert!(err.to_string().contains("sink unavailable"));
    }

    #[tokio::test]
    async fn test_processing_panic_surfaces_on_complete() {
        let processor = DelayedProcessor::new(
            |_batch: Vec<u32>| -> anyhow::Result<()> { panic!("renderer bug") },
            Duration::from_millis(10),
        )
        .unwrap();

        processor.enqueue([1]).unwrap();
        let err = processor.complete().await.unwrap_err();
        assert!(matches!(err, PipelineError::TaskPanicked(_)));
    }
}
