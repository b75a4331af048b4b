//! Configuration types for PDF-to-deck conversion.
//!
//! Service-level knobs live in [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Per-request knobs (DPI, page cap) live on
//! [`crate::request::ConversionRequest`] instead, because they arrive with
//! each upload rather than at process start. Keeping the service knobs in
//! one struct makes it trivial to share the config across request tasks
//! behind an `Arc` and to diff two deployments to understand why their
//! behaviour differs.

use crate::error::Pdf2DeckError;
use crate::pipeline::render::PageRasterizer;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default ceiling for uploaded PDF size: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Service-level conversion configuration.
///
/// Built via [`ConversionConfig::builder()`] or [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2deck::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .max_upload_bytes(10 * 1024 * 1024)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Maximum accepted input file size in bytes. Default: 50 MiB.
    ///
    /// Rasterising a PDF allocates roughly `pages × width × height × 4`
    /// bytes of pixels, so the input ceiling is the one lever that bounds
    /// peak memory for arbitrary uploads.
    pub max_upload_bytes: u64,

    /// Parent directory for transient workspaces. `None` uses the system
    /// temp directory.
    ///
    /// Point this at the same filesystem as the output directory to keep
    /// page-image writes and the final save off any slow network mount.
    pub scratch_dir: Option<PathBuf>,

    /// Pre-constructed rasterizer collaborator. `None` uses the bundled
    /// pdfium-backed implementation. Tests inject a stub here.
    pub rasterizer: Option<Arc<dyn PageRasterizer>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            scratch_dir: None,
            rasterizer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("scratch_dir", &self.scratch_dir)
            .field(
                "rasterizer",
                &self.rasterizer.as_ref().map(|_| "<dyn PageRasterizer>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2DeckError> {
        if self.config.max_upload_bytes == 0 {
            return Err(Pdf2DeckError::Internal(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
