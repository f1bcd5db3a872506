//! Background job execution.
//!
//! ## Data Flow
//!
//! ```text
//! dispatch(id)
//!   └─ tokio::spawn ───────────────────────────────────────────────┐
//!        apply(Start)                  Queued → Processing          │
//!        sleep(settle_delay)           optional                     │
//!        spawn_blocking(converter)     CPU-bound, blocking pool     │
//!        apply(Complete | Fail)        single terminal write        │
//!   ◀── JoinHandle<()> (droppable) ────────────────────────────────┘
//! ```
//!
//! One task per job. Tasks for different jobs only share the [`JobStore`].
//! A panic inside the converter is caught by the blocking task's
//! `JoinHandle` and recorded as a failure, so a job never stays
//! `Processing` because its converter crashed.

use crate::convert::Converter;
use crate::job::{Artifact, JobId, Transition};
use crate::progress::{JobEvents, NoopJobEvents};
use crate::store::JobStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Runs conversions for stored jobs and records their outcome.
#[derive(Clone)]
pub struct JobExecutor {
    store: Arc<JobStore>,
    converter: Arc<dyn Converter>,
    settle_delay: Duration,
    events: JobEvents,
}

impl JobExecutor {
    pub fn new(store: Arc<JobStore>, converter: Arc<dyn Converter>) -> Self {
        Self {
            store,
            converter,
            settle_delay: Duration::ZERO,
            events: Arc::new(NoopJobEvents),
        }
    }

    /// Pause between `Processing` and the start of conversion.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_events(mut self, events: JobEvents) -> Self {
        self.events = events;
        self
    }

    /// Start processing a `Queued` job in the background.
    ///
    /// The returned handle may be dropped; the task keeps running.
    pub fn dispatch(&self, id: JobId, input: PathBuf, output: PathBuf) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.run(id, input, output).await })
    }

    async fn run(self, id: JobId, input: PathBuf, output: PathBuf) {
        let start = Instant::now();

        if let Err(e) = self.store.apply(&id, Transition::Start) {
            // Nothing else may move a queued job, so this is a bug elsewhere.
            error!(job_id = %id, "Cannot start job: {}", e);
            return;
        }
        info!(job_id = %id, "Job processing");
        self.events.on_job_started(id);

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let converter = Arc::clone(&self.converter);
        let outcome =
            tokio::task::spawn_blocking(move || converter.convert(&input, &output)).await;

        let result = match outcome {
            Ok(Ok(artifact)) => Ok(artifact),
            Ok(Err(e)) => Err(e.to_string()),
            Err(join_err) => {
                error!(job_id = %id, "Conversion task crashed: {}", join_err);
                Err("Conversion crashed unexpectedly".to_string())
            }
        };
        self.finish(id, result, start);
    }

    fn finish(&self, id: JobId, result: Result<Artifact, String>, start: Instant) {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(artifact) => {
                let (name, size) = (artifact.name.clone(), artifact.size);
                if let Some(total_ms) = self.record(id, Transition::Complete(artifact)) {
                    info!(job_id = %id, elapsed_ms, total_ms, size, "Job completed: {}", name);
                    self.events.on_job_completed(id, size);
                }
            }
            Err(message) => {
                if let Some(total_ms) = self.record(id, Transition::Fail(message.clone())) {
                    warn!(job_id = %id, elapsed_ms, total_ms, "Job failed: {}", message);
                    self.events.on_job_failed(id, &message);
                }
            }
        }
    }

    /// Apply the terminal transition. On success, returns milliseconds since
    /// the job was created.
    fn record(&self, id: JobId, transition: Transition) -> Option<u64> {
        match self.store.apply(&id, transition) {
            Ok(_) => Some(
                self.store
                    .get(&id)
                    .map_or(0, |job| job.elapsed().as_millis() as u64),
            ),
            Err(e) => {
                error!(job_id = %id, "Cannot record job outcome: {}", e);
                None
            }
        }
    }
}
