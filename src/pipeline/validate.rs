//! Path validation: reject bad uploads before any expensive work.
//!
//! ## Why validate eagerly?
//!
//! Rasterisation is the costly step — CPU-bound, memory-hungry, and
//! file-descriptor-holding. Everything that can disqualify a request
//! (missing file, wrong type, oversized upload, non-PDF content) is checked
//! here first so that a malformed request costs microseconds, not seconds.
//! We verify the PDF magic bytes (`%PDF`) before handing the path to
//! pdfium so callers get a meaningful error rather than a pdfium crash.

use crate::error::Pdf2DeckError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension expected on uploads.
pub const INPUT_EXTENSION: &str = "pdf";

/// Extension the output path is normalised to.
pub const OUTPUT_EXTENSION: &str = "pptx";

/// Validate an input path: exists, regular file, `.pdf` extension
/// (case-insensitive), non-empty, within the size ceiling, readable, and
/// carrying the PDF magic bytes.
pub fn validate_input(path: &Path, max_bytes: u64) -> Result<(), Pdf2DeckError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DeckError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2DeckError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if !meta.is_file() {
        return Err(Pdf2DeckError::NotARegularFile {
            path: path.to_path_buf(),
        });
    }

    let has_pdf_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
        .unwrap_or(false);
    if !has_pdf_extension {
        return Err(Pdf2DeckError::WrongExtension {
            path: path.to_path_buf(),
            expected: INPUT_EXTENSION,
        });
    }

    if meta.len() == 0 {
        return Err(Pdf2DeckError::EmptyUpload {
            path: path.to_path_buf(),
        });
    }
    if meta.len() > max_bytes {
        return Err(Pdf2DeckError::UploadTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            limit: max_bytes,
        });
    }

    // Check read permission by attempting to open, then verify magic bytes.
    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
                return Err(Pdf2DeckError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DeckError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2DeckError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated input PDF: {}", path.display());
    Ok(())
}

/// Normalise an output path and prepare its location: force the `.pptx`
/// extension, create the parent directory if needed, and reject an existing
/// read-only file at the target. Returns the normalised path.
pub fn validate_output(path: &Path) -> Result<PathBuf, Pdf2DeckError> {
    let normalised = path.with_extension(OUTPUT_EXTENSION);

    if let Some(parent) = normalised.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| Pdf2DeckError::OutputWriteFailed {
                path: normalised.clone(),
                source: e,
            })?;
        }
    }

    if let Ok(meta) = std::fs::metadata(&normalised) {
        if meta.permissions().readonly() {
            return Err(Pdf2DeckError::PermissionDenied { path: normalised });
        }
    }

    debug!("Validated output path: {}", normalised.display());
    Ok(normalised)
}
