//! Error types for the pdf2pptx library.
//!
//! Three layers, three enums:
//!
//! * [`ConvertError`]: the converter could not produce an artifact (bad input
//!   file, corrupt PDF, write failure). Never returned to an HTTP client
//!   directly; the executor records its message in the job's `Failed` state.
//!
//! * [`StoreError`]: the job store refused a lookup or a state transition.
//!
//! * [`ServiceError`]: what the request-facing service returns. Synchronous
//!   validation failures and unknown ids end up here and are mapped to HTTP
//!   responses by [`crate::server`].
//!
//! [`ConfigError`] is returned by the configuration builders.

use crate::job::{JobId, JobStatus};
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while converting a single document.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output presentation.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors returned by [`crate::store::JobStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {0} already exists")]
    AlreadyExists(JobId),

    /// The requested transition is not legal from the job's current state.
    #[error("job {id}: illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Errors surfaced synchronously to a client of [`crate::service::ConversionService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submitted upload was missing, empty or of the wrong kind.
    #[error("{0}")]
    InvalidInput(String),

    /// The job id is unknown, or the job is not in the state the query needs.
    #[error("{message}")]
    NotFound { message: String },

    /// The upload exceeded the configured body limit.
    #[error("File too large (limit is {limit} bytes)")]
    TooLarge { limit: usize },

    /// The upload could not be persisted to disk.
    #[error("Failed to store upload at '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound {
            message: message.into(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ServiceError::not_found("Invalid uploadId"),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display_includes_path() {
        let e = ConvertError::NotAPdf {
            path: PathBuf::from("/tmp/x.pdf"),
            magic: b"PK\x03\x04".to_vec(),
        };
        assert!(e.to_string().contains("/tmp/x.pdf"), "got: {e}");
    }

    #[test]
    fn store_not_found_maps_to_service_not_found() {
        let id = JobId::new();
        let err: ServiceError = StoreError::NotFound(id).into();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[test]
    fn illegal_transition_maps_to_internal() {
        let id = JobId::new();
        let err: ServiceError = StoreError::IllegalTransition {
            id,
            from: JobStatus::Completed,
            to: JobStatus::Processing,
        }
        .into();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(err.to_string().contains("illegal transition"));
    }

    #[test]
    fn invalid_input_display_is_bare_message() {
        let e = ServiceError::InvalidInput("No file part".into());
        assert_eq!(e.to_string(), "No file part");
    }
}
