//! One conversion attempt, identified by a generated UUID.
//!
//! The id is baked into every filename the request touches, which is the
//! entire concurrency story: two requests can never name the same file, so
//! no path needs a lock. [`ConversionRequest::in_dirs`] is the constructor
//! the HTTP layer uses — it derives both the saved-upload path and the
//! output path from the fresh id.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Rendering resolution applied when the upload does not specify one.
pub const DEFAULT_DPI: u32 = 300;

/// Identifies one conversion attempt. Immutable once handed to
/// [`crate::convert::convert`].
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Unique request identifier; embedded in every path this request creates.
    pub id: Uuid,
    /// Path of the saved upload to convert.
    pub input: PathBuf,
    /// Desired output path; the extension is normalised to `.pptx` during
    /// validation.
    pub output: PathBuf,
    /// Rendering resolution in dots per inch. Accepted range: 72–600.
    pub dpi: u32,
    /// Optional cap on the number of pages converted (first N, in order).
    pub max_pages: Option<usize>,
}

impl ConversionRequest {
    /// Build a request for explicit input and output paths.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            input: input.into(),
            output: output.into(),
            dpi: DEFAULT_DPI,
            max_pages: None,
        }
    }

    /// Build a request whose input and output filenames are derived from
    /// the generated id: `{id}.pdf` under `upload_dir`, `{id}.pptx` under
    /// `output_dir`.
    pub fn in_dirs(upload_dir: &Path, output_dir: &Path) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            input: upload_dir.join(format!("{id}.pdf")),
            output: output_dir.join(format!("{id}.pptx")),
            dpi: DEFAULT_DPI,
            max_pages: None,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}
