//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why a trait object?
//!
//! The rasterizer is the one external collaborator in the pipeline. Hiding
//! pdfium behind [`PageRasterizer`] keeps the orchestrator testable without
//! a native library on the machine — tests inject a stub through
//! `ConversionConfig::rasterizer` the same way production injects nothing
//! and gets [`PdfiumRasterizer`].
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread pool thread designed for blocking operations, preventing the
//! Tokio worker threads from stalling during CPU-heavy rendering.

use crate::error::Pdf2DeckError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// The rasterisation collaborator: a validated PDF in, an ordered sequence
/// of page images out. Implementations are blocking; the orchestrator runs
/// them under `spawn_blocking`.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of `pdf_path` at `dpi` dots per inch, in document
    /// order.
    fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, Pdf2DeckError>;
}

/// Production rasterizer backed by pdfium.
#[derive(Debug, Default)]
pub struct PdfiumRasterizer;

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, Pdf2DeckError> {
        render_pages_blocking(pdf_path, dpi)
    }
}

/// Rasterise all pages of a PDF on the blocking thread pool.
pub async fn rasterize_pages(
    rasterizer: Arc<dyn PageRasterizer>,
    pdf_path: &Path,
    dpi: u32,
) -> Result<Vec<DynamicImage>, Pdf2DeckError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || rasterizer.rasterize(&path, dpi))
        .await
        .map_err(|e| Pdf2DeckError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(pdf_path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, Pdf2DeckError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| Pdf2DeckError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(Pdf2DeckError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }
    info!("PDF loaded: {} pages", total_pages);

    let mut results = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| Pdf2DeckError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        // PDF page sizes are in points (1/72 in); scale to pixels at `dpi`.
        let width_px = (page.width().value as f64 * dpi as f64 / 72.0).round().max(1.0) as i32;
        let height_px = (page.height().value as f64 * dpi as f64 / 72.0).round().max(1.0) as i32;
        let render_config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_maximum_height(height_px);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2DeckError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(image);
    }

    Ok(results)
}
