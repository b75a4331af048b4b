//! # pdf2deck
//!
//! Convert PDF documents into image-per-slide PowerPoint decks.
//!
//! ## Why this crate?
//!
//! Sharing a PDF in a meeting usually means someone screenshots pages into
//! slides by hand. This crate automates exactly that: every page is
//! rasterised and dropped full-bleed onto its own slide, with the deck
//! sized to the first page's aspect ratio, so the result looks like the
//! source document rather than a re-flowed approximation.
//!
//! The service half is built around one guarantee: **nothing persists**.
//! The saved upload, the intermediate page images, and the generated deck
//! are all transient — the page images die with the request's scoped
//! workspace, and the upload/deck pair is erased by a dual-tier cleanup
//! scheduler (an immediate post-response deletion plus a delayed fallback,
//! backstopped by an age-based sweep).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF upload
//!  │
//!  ├─ 1. Validate  extension, size ceiling, %PDF magic, output path
//!  ├─ 2. Render    rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Geometry  canvas = 13.33 in × first page's aspect ratio
//!  ├─ 4. Assemble  one full-bleed image slide per page (zip/OOXML)
//!  └─ 5. Cleanup   workspace gone at return; upload + deck erased after
//!                  the response (immediate + fallback + sweep)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2deck::{convert, ConversionConfig, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let request = ConversionRequest::new("document.pdf", "document.pptx")
//!         .with_dpi(150);
//!     let artifact = convert(&request, &config).await?;
//!     println!("{} slides → {}", artifact.slides, artifact.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Enables the `pdf2deck` HTTP binary (axum + clap + anyhow + tracing-subscriber) |
//!
//! Disable `server` when using only the library:
//! ```toml
//! pdf2deck = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cleanup;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod request;
#[cfg(feature = "server")]
pub mod server;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cleanup::CleanupConfig;
pub use config::{ConversionConfig, ConversionConfigBuilder, DEFAULT_MAX_UPLOAD_BYTES};
pub use convert::convert;
pub use error::Pdf2DeckError;
pub use output::{ConversionStats, OutputArtifact};
pub use pipeline::deck::DeckBuilder;
pub use pipeline::geometry::{SlideCanvas, REFERENCE_WIDTH_IN};
pub use pipeline::render::{PageRasterizer, PdfiumRasterizer};
pub use request::{ConversionRequest, DEFAULT_DPI};
pub use workspace::Workspace;
