//! In-memory job store.
//!
//! A `RwLock<HashMap<JobId, Job>>`. Readers get an owned snapshot cloned
//! under the read lock, so a query sees a record either entirely before or
//! entirely after a transition. Writers validate the transition first and
//! swap the state in a single assignment under the write lock.

use crate::error::StoreError;
use crate::job::{Job, JobId, JobStatus, Transition};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Concurrency-safe map from job id to job record.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new `Queued` job. Ids are never reused.
    pub fn create(&self, id: JobId, input_path: PathBuf) -> Result<(), StoreError> {
        let mut jobs = self.write();
        if jobs.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        jobs.insert(id, Job::new(id, input_path));
        debug!(job_id = %id, "job created");
        Ok(())
    }

    /// Snapshot of the job record, if it exists.
    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.read().get(id).cloned()
    }

    /// Move a job through its state machine.
    ///
    /// This is the only mutation path for an existing job. The returned
    /// status is the job's state after the transition.
    pub fn apply(&self, id: &JobId, transition: Transition) -> Result<JobStatus, StoreError> {
        let mut jobs = self.write();
        let job = jobs.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        job.apply(transition)?;
        Ok(job.status())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, Job>> {
        match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, Job>> {
        match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
