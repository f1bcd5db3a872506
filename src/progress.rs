//! Lifecycle-callback trait for job events.
//!
//! Inject an [`Arc<dyn JobEventCallback>`] via
//! [`crate::service::ConversionService::with_events`] to observe jobs as the
//! executor moves them through their states. Callers can forward events to a
//! metrics sink, a broadcast channel or a log without the service knowing
//! how they are consumed.
//!
//! Events fire after the store has committed the corresponding transition,
//! so a callback that queries the service sees the new state.
//!
//! # Example
//!
//! ```rust
//! use pdf2pptx::{JobEventCallback, JobId};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct CountCompleted(AtomicUsize);
//!
//! impl JobEventCallback for CountCompleted {
//!     fn on_job_completed(&self, _id: JobId, _size: u64) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::job::JobId;
use std::sync::Arc;

/// Called by the service and executor at each job transition.
///
/// Implementations must be `Send + Sync`: events for different jobs arrive
/// concurrently from different executor tasks. All methods default to no-ops.
pub trait JobEventCallback: Send + Sync {
    /// A job was accepted and stored as `Queued`.
    fn on_job_created(&self, id: JobId) {
        let _ = id;
    }

    /// The executor moved the job to `Processing`.
    fn on_job_started(&self, id: JobId) {
        let _ = id;
    }

    /// The job reached `Completed`.
    ///
    /// # Arguments
    /// * `id`  : the job
    /// * `size`: artifact size in bytes
    fn on_job_completed(&self, id: JobId, size: u64) {
        let _ = (id, size);
    }

    /// The job reached `Failed`.
    fn on_job_failed(&self, id: JobId, error: &str) {
        let _ = (id, error);
    }
}

/// Default when no callback is configured.
pub struct NoopJobEvents;

impl JobEventCallback for NoopJobEvents {}

/// Shared handle stored by the service and executor.
pub type JobEvents = Arc<dyn JobEventCallback>;
