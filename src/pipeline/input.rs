//! Input checks shared by intake and the converter.
//!
//! Uploads are validated on their bytes before being written to disk; the
//! converter re-validates the stored file since it can also be driven
//! directly on arbitrary paths.

use crate::error::ConvertError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The four bytes every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Extensions accepted for upload (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf"];

/// Whether `filename` has an accepted extension.
pub fn has_accepted_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted)),
        None => false,
    }
}

/// Whether `bytes` begin with the PDF signature.
pub fn has_pdf_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Validate a local file path, checking existence and PDF magic bytes.
pub fn validate_local(path: &Path) -> Result<PathBuf, ConvertError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConvertError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConvertError::Internal(format!("Cannot open '{}': {}", path.display(), e)),
    })?;

    let mut magic = Vec::with_capacity(PDF_MAGIC.len());
    file.by_ref()
        .take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut magic)
        .map_err(|e| ConvertError::Internal(format!("Cannot read '{}': {}", path.display(), e)))?;

    if !has_pdf_magic(&magic) {
        return Err(ConvertError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_accepted_extension() {
        assert!(has_accepted_extension("report.pdf"));
        assert!(has_accepted_extension("REPORT.PDF"));
        assert!(has_accepted_extension("archive.tar.pdf"));
        assert!(!has_accepted_extension("report.docx"));
        assert!(!has_accepted_extension("pdf"));
        assert!(!has_accepted_extension(""));
        assert!(!has_accepted_extension("report.pdf.exe"));
    }

    #[test]
    fn test_pdf_magic() {
        assert!(has_pdf_magic(b"%PDF-1.7\n"));
        assert!(!has_pdf_magic(b"%PD"));
        assert!(!has_pdf_magic(b"PK\x03\x04"));
        assert!(!has_pdf_magic(b""));
    }

    #[test]
    fn test_validate_missing_file() {
        let err = validate_local(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn test_validate_wrong_magic() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"hello world").unwrap();
        let err = validate_local(f.path()).unwrap_err();
        match err {
            ConvertError::NotAPdf { magic, .. } => assert_eq!(magic, b"hell".to_vec()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_short_file() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"%P").unwrap();
        assert!(matches!(
            validate_local(f.path()),
            Err(ConvertError::NotAPdf { .. })
        ));
    }

    #[test]
    fn test_validate_pdf_header() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.5\n%rest").unwrap();
        assert_eq!(validate_local(f.path()).unwrap(), f.path());
    }
}
