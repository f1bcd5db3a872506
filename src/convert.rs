//! Conversion entry points.
//!
//! [`Converter`] is the seam between the job executor and the document
//! pipeline: the executor only knows "input path in, artifact out". The
//! default implementation, [`PdfToPptx`], runs the full
//! `input → extract → clean → layout → pptx` pipeline.
//!
//! Conversion is synchronous and CPU-bound. Async callers go through
//! [`convert_file`], which moves the work onto the blocking pool.

use crate::config::LayoutConfig;
use crate::error::ConvertError;
use crate::job::Artifact;
use crate::pipeline::{extract, input, layout, pptx};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Turns the document at `input` into an artifact written at `output`.
///
/// Implementations must be reentrant: several jobs may convert at once, each
/// with its own output path.
pub trait Converter: Send + Sync {
    fn convert(&self, input: &Path, output: &Path) -> Result<Artifact, ConvertError>;
}

/// Summary of one conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub artifact: Artifact,
    /// Pages in the source PDF, including blank ones.
    pub pages: usize,
    /// Text blocks placed on slides.
    pub blocks: usize,
    pub slides: usize,
    pub duration_ms: u64,
}

/// PDF → PPTX converter: one text box per extracted text block.
#[derive(Debug, Clone, Default)]
pub struct PdfToPptx {
    layout: LayoutConfig,
}

impl PdfToPptx {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Run the pipeline and report what was produced.
    pub fn run(&self, input_path: &Path, output_path: &Path) -> Result<ConversionReport, ConvertError> {
        let start = Instant::now();
        info!("Starting conversion: {}", input_path.display());

        // ── Step 1: Validate input ───────────────────────────────────────
        let pdf_path = input::validate_local(input_path)?;

        // ── Step 2: Extract + clean text blocks ──────────────────────────
        let pages = extract::extract_pages(&pdf_path)?;
        let blocks: usize = pages.iter().map(|p| p.blocks.len()).sum();
        debug!("Extracted {} blocks from {} pages", blocks, pages.len());

        // ── Step 3: Lay out slides ───────────────────────────────────────
        let slides = layout::paginate(&pages, &self.layout);

        // ── Step 4: Write presentation ───────────────────────────────────
        let title = pdf_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Presentation");
        pptx::write_presentation(&slides, &self.layout, title, output_path)?;

        let artifact =
            Artifact::from_path(output_path).map_err(|source| ConvertError::OutputWriteFailed {
                path: output_path.to_path_buf(),
                source,
            })?;

        let report = ConversionReport {
            pages: pages.len(),
            blocks,
            slides: slides.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            artifact,
        };
        info!(
            "Converted {} pages → {} slides ({} bytes) in {}ms",
            report.pages, report.slides, report.artifact.size, report.duration_ms
        );
        Ok(report)
    }
}

impl Converter for PdfToPptx {
    fn convert(&self, input: &Path, output: &Path) -> Result<Artifact, ConvertError> {
        self.run(input, output).map(|report| report.artifact)
    }
}

/// Convert a PDF file to a PPTX file without going through the job service.
///
/// Runs the conversion on tokio's blocking pool.
pub async fn convert_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    layout: &LayoutConfig,
) -> Result<ConversionReport, ConvertError> {
    let input_path: PathBuf = input_path.as_ref().to_path_buf();
    let output_path: PathBuf = output_path.as_ref().to_path_buf();
    let converter = PdfToPptx::new(layout.clone());

    tokio::task::spawn_blocking(move || converter.run(&input_path, &output_path))
        .await
        .map_err(|e| ConvertError::Internal(format!("conversion task failed: {e}")))?
}
