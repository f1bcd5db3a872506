//! The conversion job record and its state machine.
//!
//! ```text
//! Queued ──▶ Processing ──┬──▶ Completed(artifact)
//!                         └──▶ Failed(message)
//! ```
//!
//! A [`Job`] has no public setters. The only way to move it forward is
//! [`crate::store::JobStore::apply`] with a [`Transition`], which checks the
//! move against [`Job::apply`] before committing it.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use uuid::Uuid;

// ── JobId ────────────────────────────────────────────────────────────────

/// Opaque job identifier (a random UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ── Status / state ───────────────────────────────────────────────────────

/// Payload-free view of a job's state, used on the wire and in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    /// Spelled `error` on the wire, which is what polling clients expect.
    #[serde(rename = "error")]
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// The converted output file of a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Where the artifact lives on disk.
    pub path: PathBuf,
    /// Display filename used for delivery.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl Artifact {
    /// Describe an already-written file, reading its size from disk.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("converted-presentation.pptx")
            .to_string();
        Ok(Self { path, name, size })
    }
}

/// Full job state. Output and error data only exist on the terminal variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Processing,
    Completed(Artifact),
    Failed { error: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Processing => JobStatus::Processing,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// A requested state change.
#[derive(Debug, Clone)]
pub enum Transition {
    Start,
    Complete(Artifact),
    Fail(String),
}

impl Transition {
    fn target(&self) -> JobStatus {
        match self {
            Transition::Start => JobStatus::Processing,
            Transition::Complete(_) => JobStatus::Completed,
            Transition::Fail(_) => JobStatus::Failed,
        }
    }
}

// ── Job ──────────────────────────────────────────────────────────────────

/// One tracked conversion request.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    input_path: PathBuf,
    state: JobState,
    created_at: Instant,
    updated_at: Instant,
}

impl Job {
    pub(crate) fn new(id: JobId, input_path: PathBuf) -> Self {
        let now = Instant::now();
        Self {
            id,
            input_path,
            state: JobState::Queued,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    /// Present iff the job is `Completed`.
    pub fn artifact(&self) -> Option<&Artifact> {
        match &self.state {
            JobState::Completed(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Present iff the job is `Failed`.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn updated_at(&self) -> Instant {
        self.updated_at
    }

    /// Time from creation to the latest transition. For a terminal job this
    /// is queue time plus run time.
    pub fn elapsed(&self) -> Duration {
        self.updated_at.duration_since(self.created_at)
    }

    /// Apply a transition, or refuse it without touching the record.
    pub(crate) fn apply(&mut self, transition: Transition) -> Result<(), StoreError> {
        let next = match (&self.state, transition) {
            (JobState::Queued, Transition::Start) => JobState::Processing,
            (JobState::Processing, Transition::Complete(artifact)) => JobState::Completed(artifact),
            (JobState::Processing, Transition::Fail(error)) => JobState::Failed { error },
            (state, transition) => {
                return Err(StoreError::IllegalTransition {
                    id: self.id,
                    from: state.status(),
                    to: transition.target(),
                })
            }
        };
        self.state = next;
        self.updated_at = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> Artifact {
        Artifact {
            path: PathBuf::from("/out/x.pptx"),
            name: "x.pptx".into(),
            size: 42,
        }
    }

    fn job() -> Job {
        Job::new(JobId::new(), PathBuf::from("/in/x.pdf"))
    }

    #[test]
    fn new_job_is_queued_without_outputs() {
        let job = job();
        assert_eq!(job.status(), JobStatus::Queued);
        assert!(job.artifact().is_none());
        assert!(job.error().is_none());
    }

    #[test]
    fn happy_path_to_completed() {
        let mut job = job();
        job.apply(Transition::Start).unwrap();
        assert_eq!(job.status(), JobStatus::Processing);
        job.apply(Transition::Complete(artifact())).unwrap();
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.artifact(), Some(&artifact()));
        assert!(job.error().is_none());
    }

    #[test]
    fn processing_to_failed_records_message() {
        let mut job = job();
        job.apply(Transition::Start).unwrap();
        job.apply(Transition::Fail("boom".into())).unwrap();
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error(), Some("boom"));
        assert!(job.artifact().is_none());
    }

    #[test]
    fn cannot_skip_processing() {
        let mut job = job();
        let err = job.apply(Transition::Complete(artifact())).unwrap_err();
        assert!(matches!(
            err,
            StoreError::IllegalTransition {
                from: JobStatus::Queued,
                to: JobStatus::Completed,
                ..
            }
        ));
        assert_eq!(job.status(), JobStatus::Queued);
    }

    #[test]
    fn terminal_states_are_frozen() {
        let mut job = job();
        job.apply(Transition::Start).unwrap();
        job.apply(Transition::Fail("first".into())).unwrap();
        let before = job.updated_at();

        assert!(job.apply(Transition::Start).is_err());
        assert!(job.apply(Transition::Fail("second".into())).is_err());
        assert!(job.apply(Transition::Complete(artifact())).is_err());

        assert_eq!(job.error(), Some("first"));
        assert_eq!(job.updated_at(), before);
    }

    #[test]
    fn elapsed_spans_creation_to_last_transition() {
        let mut job = job();
        assert_eq!(job.elapsed(), Duration::ZERO);

        std::thread::sleep(Duration::from_millis(20));
        job.apply(Transition::Start).unwrap();
        job.apply(Transition::Complete(artifact())).unwrap();

        assert!(job.elapsed() >= Duration::from_millis(20));
        assert_eq!(job.elapsed(), job.updated_at() - job.created_at());
    }

    #[test]
    fn job_id_round_trips_through_display() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<JobId>().is_err());
    }

    #[test]
    fn failed_status_serialises_as_error() {
        assert_eq!(serde_json::to_string(&JobStatus::Failed).unwrap(), "\"error\"");
        assert_eq!(serde_json::to_string(&JobStatus::Queued).unwrap(), "\"queued\"");
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }
}
