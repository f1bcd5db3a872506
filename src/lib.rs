//! # pdf2pptx
//!
//! Convert uploaded PDF documents to PowerPoint presentations through an
//! asynchronous job API.
//!
//! A client uploads a PDF and immediately receives a job id. The conversion
//! runs in the background while the client polls for status, and the
//! finished `.pptx` is downloaded once the job has completed.
//!
//! ## Job Lifecycle
//!
//! ```text
//! upload ─▶ Queued ─▶ Processing ─┬─▶ Completed ─▶ result / download
//!                                 └─▶ Failed (status carries the error)
//! ```
//!
//! ## Conversion Pipeline
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    check the file exists and starts with %PDF
//!  ├─ 2. Extract  per-page text via lopdf (CPU-bound, spawn_blocking)
//!  ├─ 3. Clean    normalise text into non-empty blocks
//!  ├─ 4. Layout   stack blocks into fixed-height boxes, paginate slides
//!  └─ 5. PPTX     write an Office Open XML package atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pptx::{ConversionService, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::builder().port(8080).build()?;
//!     let service = ConversionService::from_config(config);
//!     service.init_dirs()?;
//!     pdf2pptx::server::serve(service).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2pptx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2pptx = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod executor;
pub mod job;
pub mod pipeline;
pub mod progress;
pub mod server;
pub mod service;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{LayoutConfig, ServiceConfig, ServiceConfigBuilder};
pub use convert::{convert_file, ConversionReport, Converter, PdfToPptx};
pub use error::{ConfigError, ConvertError, ServiceError, StoreError};
pub use executor::JobExecutor;
pub use job::{Artifact, Job, JobId, JobState, JobStatus, Transition};
pub use progress::{JobEventCallback, JobEvents, NoopJobEvents};
pub use server::build_router;
pub use service::{ConversionService, ResultResponse, StatusResponse, UploadResponse};
pub use store::JobStore;
