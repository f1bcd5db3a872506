//! Text extraction with lopdf.
//!
//! Runs synchronously; callers on an async runtime wrap it in
//! `tokio::task::spawn_blocking` (see [`crate::convert::convert_file`] and
//! [`crate::executor`]).

use crate::error::ConvertError;
use crate::pipeline::clean;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, info, warn};

/// The cleaned text blocks of one PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_number: u32,
    pub blocks: Vec<String>,
}

/// Load a PDF and extract the text blocks of every page, in page order.
///
/// A page whose text cannot be decoded is logged and yields no blocks; only a
/// document that cannot be parsed at all is an error.
pub fn extract_pages(pdf_path: &Path) -> Result<Vec<PageText>, ConvertError> {
    let document = Document::load(pdf_path).map_err(|e| ConvertError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = document.get_pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut result = Vec::with_capacity(pages.len());
    for page_number in pages.keys().copied() {
        let blocks = match document.extract_text(&[page_number]) {
            Ok(raw) => clean::split_blocks(&raw),
            Err(e) => {
                warn!("Skipping text of page {}: {}", page_number, e);
                Vec::new()
            }
        };
        debug!("Page {} → {} text blocks", page_number, blocks.len());
        result.push(PageText {
            page_number,
            blocks,
        });
    }

    Ok(result)
}
