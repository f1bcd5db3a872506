//! Request-facing conversion service: intake, status, result and delivery.
//!
//! ## Data Flow
//!
//! ```text
//! submit(filename, bytes)
//!  ├─ 1. Validate   name present, .pdf extension, non-empty, %PDF magic
//!  ├─ 2. Persist    <upload_dir>/<id>.pdf
//!  ├─ 3. Register   store.create(id)            → Queued
//!  ├─ 4. Dispatch   executor.dispatch(id)       → background task
//!  └─ 5. Return     id
//! ```
//!
//! Steps 2–5 happen in that order, so a job is visible in the store before
//! its id is handed to anyone, and the executor never starts on a job the
//! store does not know.
//!
//! Queries take the store's read lock only long enough to clone a record.

use crate::config::ServiceConfig;
use crate::convert::{Converter, PdfToPptx};
use crate::error::ServiceError;
use crate::executor::JobExecutor;
use crate::job::{Artifact, Job, JobId, JobStatus};
use crate::pipeline::input;
use crate::progress::{JobEvents, NoopJobEvents};
use crate::store::JobStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reply to a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub upload_id: JobId,
}

/// Reply to a status poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: JobStatus,
    /// 0 until the job completes, then 100.
    pub progress: u8,
    pub upload_id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to a result query on a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub download_url: String,
    pub filename: String,
    pub file_size: u64,
}

/// Path clients use to fetch a completed job's artifact.
pub fn download_url(id: JobId) -> String {
    format!("/api/download/{id}")
}

/// Owns the job store and executor and answers client requests.
#[derive(Clone)]
pub struct ConversionService {
    config: Arc<ServiceConfig>,
    store: Arc<JobStore>,
    executor: JobExecutor,
    events: JobEvents,
}

impl ConversionService {
    pub fn new(config: ServiceConfig, store: Arc<JobStore>, converter: Arc<dyn Converter>) -> Self {
        let executor =
            JobExecutor::new(Arc::clone(&store), converter).with_settle_delay(config.settle_delay());
        Self {
            config: Arc::new(config),
            store,
            executor,
            events: Arc::new(NoopJobEvents),
        }
    }

    /// A service with a fresh store and the PDF → PPTX converter.
    pub fn from_config(config: ServiceConfig) -> Self {
        let converter = Arc::new(PdfToPptx::new(config.layout.clone()));
        Self::new(config, Arc::new(JobStore::new()), converter)
    }

    /// Observe job lifecycle events.
    pub fn with_events(mut self, events: JobEvents) -> Self {
        self.executor = self.executor.with_events(Arc::clone(&events));
        self.events = events;
        self
    }

    /// Create the upload and output directories.
    pub fn init_dirs(&self) -> Result<(), ServiceError> {
        for dir in [&self.config.upload_dir, &self.config.output_dir] {
            std::fs::create_dir_all(dir).map_err(|source| ServiceError::Storage {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    // ── Intake ───────────────────────────────────────────────────────────

    /// Validate and persist an upload, register its job, and start it.
    ///
    /// `filename` is only checked for its extension; it never names a file
    /// on disk.
    pub async fn submit(&self, filename: Option<&str>, data: &[u8]) -> Result<JobId, ServiceError> {
        let filename = filename.unwrap_or_default();
        if filename.is_empty() {
            return Err(ServiceError::InvalidInput("No selected file".into()));
        }
        if !input::has_accepted_extension(filename) {
            return Err(ServiceError::InvalidInput("Invalid file type".into()));
        }
        if data.is_empty() {
            return Err(ServiceError::InvalidInput("Empty file".into()));
        }
        if !input::has_pdf_magic(data) {
            return Err(ServiceError::InvalidInput("File is not a valid PDF".into()));
        }

        let id = JobId::new();
        self.enqueue(id, filename, data).await?;
        Ok(id)
    }

    /// Persist the upload, register `id` and dispatch it. An upload whose
    /// job cannot be registered is removed again.
    async fn enqueue(&self, id: JobId, filename: &str, data: &[u8]) -> Result<(), ServiceError> {
        let input_path = self.upload_path(id);
        tokio::fs::write(&input_path, data)
            .await
            .map_err(|source| ServiceError::Storage {
                path: input_path.clone(),
                source,
            })?;
        debug!(job_id = %id, "Stored upload at {}", input_path.display());

        if let Err(err) = self.store.create(id, input_path.clone()) {
            if let Err(e) = tokio::fs::remove_file(&input_path).await {
                warn!(job_id = %id, "Failed to remove orphaned upload: {}", e);
            }
            return Err(err.into());
        }
        info!(job_id = %id, bytes = data.len(), "Job queued: {}", filename);
        self.events.on_job_created(id);

        self.executor.dispatch(id, input_path, self.output_path(id));
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn status(&self, raw_id: &str) -> Result<StatusResponse, ServiceError> {
        let job = self.lookup(raw_id, "Invalid uploadId")?;
        let status = job.status();
        Ok(StatusResponse {
            status,
            progress: if status == JobStatus::Completed { 100 } else { 0 },
            upload_id: job.id(),
            download_url: job.artifact().map(|_| download_url(job.id())),
            error: job.error().map(str::to_string),
        })
    }

    pub fn result(&self, raw_id: &str) -> Result<ResultResponse, ServiceError> {
        let job = self.lookup(raw_id, NOT_READY)?;
        let artifact = completed_artifact(&job)?;
        Ok(ResultResponse {
            download_url: download_url(job.id()),
            filename: artifact.name.clone(),
            file_size: artifact.size,
        })
    }

    /// The artifact of a completed job, for delivery.
    pub fn artifact(&self, raw_id: &str) -> Result<Artifact, ServiceError> {
        let job = self.lookup(raw_id, NOT_READY)?;
        completed_artifact(&job).cloned()
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Malformed and unknown ids both yield `NotFound(missing)`. Only the
    /// exact string handed out at upload matches; other spellings of the
    /// same UUID (uppercase, `urn:uuid:`, unhyphenated) do not.
    fn lookup(&self, raw_id: &str, missing: &str) -> Result<Job, ServiceError> {
        raw_id
            .parse::<JobId>()
            .ok()
            .filter(|id| id.to_string() == raw_id)
            .and_then(|id| self.store.get(&id))
            .ok_or_else(|| ServiceError::not_found(missing))
    }

    fn upload_path(&self, id: JobId) -> PathBuf {
        self.config.upload_dir.join(format!("{id}.pdf"))
    }

    fn output_path(&self, id: JobId) -> PathBuf {
        self.config.output_dir.join(format!("{id}.pptx"))
    }
}

const NOT_READY: &str = "Not ready";

fn completed_artifact(job: &Job) -> Result<&Artifact, ServiceError> {
    job.artifact().ok_or_else(|| ServiceError::not_found(NOT_READY))
}
