//! Concurrency primitives behind the live report.
//!
//! Leaf to root: [`AutoResetEvent`] is the wakeup signal, [`Debouncer`]
//! coalesces bursts of enqueues into one delayed wakeup, and
//! [`DelayedProcessor`] drains the buffered items into sequential batches.
//!
//! # Lock Ordering
//!
//! 1. **queue lock** (DelayedProcessor buffer): acquired first
//! 2. **event state lock** (AutoResetEvent): never held together with the queue lock
//!
//! Locks are only held for pointer and flag updates, never across an await.

pub mod auto_reset;
pub mod debouncer;
pub mod delayed;

pub use auto_reset::{AutoResetEvent, Wait};
pub use debouncer::Debouncer;
pub use delayed::DelayedProcessor;
