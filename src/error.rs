//! Error types for the pdf2deck library.
//!
//! One flat enum covers the whole pipeline, grouped by failure domain:
//! validation errors are raised before any expensive work and map to
//! 4xx-class responses, pipeline errors (rasterisation, geometry, assembly,
//! persistence) surface to the caller as a generic conversion failure while
//! the specific stage and cause go to the log. [`Pdf2DeckError::stage`]
//! provides the short label used in those log lines, and
//! [`Pdf2DeckError::is_client_error`] drives the HTTP status mapping.
//!
//! Workspace-release and cleanup failures never appear here at all — they
//! are logged warnings inside [`crate::workspace`] and [`crate::cleanup`],
//! since they cannot affect the correctness of a response already sent.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2deck library.
#[derive(Debug, Error)]
pub enum Pdf2DeckError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The input path exists but is not a regular file.
    #[error("Not a regular file: '{path}'")]
    NotARegularFile { path: PathBuf },

    /// Process does not have the required permission on the path.
    #[error("Permission denied for '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The upload has a zero byte size.
    #[error("Uploaded file is empty: '{path}'")]
    EmptyUpload { path: PathBuf },

    /// The input filename does not carry the expected extension.
    #[error("Expected a .{expected} file, got '{path}'")]
    WrongExtension {
        path: PathBuf,
        expected: &'static str,
    },

    /// The upload exceeds the configured size ceiling.
    #[error("Upload is {size} bytes, limit is {limit} bytes: '{path}'")]
    UploadTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Parameter errors ──────────────────────────────────────────────────
    /// Requested rendering resolution is outside the accepted range.
    #[error("DPI must be 72–600, got {dpi}")]
    DpiOutOfRange { dpi: u32 },

    /// Requested page cap is not a positive integer.
    #[error("Page limit must be at least 1, got {limit}")]
    InvalidPageLimit { limit: usize },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The document parsed but contains no pages.
    #[error("PDF '{path}' contains no pages")]
    EmptyDocument { path: PathBuf },

    /// The rasterisation collaborator failed on a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// A rendered page came back with a zero pixel dimension.
    #[error("Page {page} rendered to a degenerate {width}x{height} image")]
    DegeneratePageImage {
        page: usize,
        width: u32,
        height: u32,
    },

    // ── Geometry errors ───────────────────────────────────────────────────
    /// First-page pixel dimensions cannot produce an aspect ratio.
    #[error("Cannot derive an aspect ratio from a {width}x{height} page")]
    DegenerateAspect { width: u32, height: u32 },

    /// The derived canvas height is non-finite or non-positive.
    #[error("Derived canvas height {height_in} in is not usable")]
    CanvasOutOfRange { height_in: f64 },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// Persisting a page image or appending its slide failed.
    #[error("Slide assembly failed at page {page}: {detail}")]
    SlideAssemblyFailed { page: usize, detail: String },

    // ── Persistence errors ────────────────────────────────────────────────
    /// Could not create or write the output presentation file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Infrastructure errors ─────────────────────────────────────────────
    /// The transient workspace directory could not be created.
    #[error("Failed to create transient workspace: {detail}")]
    WorkspaceFailed { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2DeckError {
    /// True for errors caused by the request itself (bad upload, bad
    /// parameters) rather than by the conversion machinery. The HTTP layer
    /// maps these to 4xx statuses with the specific message; everything
    /// else becomes a generic 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Pdf2DeckError::FileNotFound { .. }
                | Pdf2DeckError::NotARegularFile { .. }
                | Pdf2DeckError::PermissionDenied { .. }
                | Pdf2DeckError::EmptyUpload { .. }
                | Pdf2DeckError::WrongExtension { .. }
                | Pdf2DeckError::UploadTooLarge { .. }
                | Pdf2DeckError::NotAPdf { .. }
                | Pdf2DeckError::DpiOutOfRange { .. }
                | Pdf2DeckError::InvalidPageLimit { .. }
        )
    }

    /// Short pipeline-stage label for structured log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Pdf2DeckError::FileNotFound { .. }
            | Pdf2DeckError::NotARegularFile { .. }
            | Pdf2DeckError::PermissionDenied { .. }
            | Pdf2DeckError::EmptyUpload { .. }
            | Pdf2DeckError::WrongExtension { .. }
            | Pdf2DeckError::UploadTooLarge { .. }
            | Pdf2DeckError::NotAPdf { .. } => "validate",
            Pdf2DeckError::DpiOutOfRange { .. } | Pdf2DeckError::InvalidPageLimit { .. } => {
                "parameters"
            }
            Pdf2DeckError::CorruptPdf { .. }
            | Pdf2DeckError::EmptyDocument { .. }
            | Pdf2DeckError::RasterisationFailed { .. }
            | Pdf2DeckError::DegeneratePageImage { .. }
            | Pdf2DeckError::PdfiumBindingFailed(_) => "rasterise",
            Pdf2DeckError::DegenerateAspect { .. } | Pdf2DeckError::CanvasOutOfRange { .. } => {
                "geometry"
            }
            Pdf2DeckError::SlideAssemblyFailed { .. } => "assemble",
            Pdf2DeckError::OutputWriteFailed { .. } => "persist",
            Pdf2DeckError::WorkspaceFailed { .. } | Pdf2DeckError::Internal(_) => "internal",
        }
    }
}
