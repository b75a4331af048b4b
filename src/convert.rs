//! The conversion orchestrator: one atomic PDF → deck operation.
//!
//! ## Why all-or-nothing?
//!
//! From the caller's perspective `convert` either produces a complete
//! `.pptx` at the validated output path or leaves the filesystem exactly
//! as it found it: any failure after validation deletes a partially
//! written output file, and the transient workspace is removed on every
//! exit path via its scoped guard. The caller never has to clean up after
//! a failed conversion — only after a successful one, which is the cleanup
//! scheduler's job.
//!
//! Parameter validation runs before any file I/O so that an out-of-range
//! DPI or a zero page cap is rejected without touching the disk at all.

use crate::cleanup;
use crate::config::ConversionConfig;
use crate::error::Pdf2DeckError;
use crate::output::{ConversionStats, OutputArtifact};
use crate::pipeline::deck::DeckBuilder;
use crate::pipeline::geometry::SlideCanvas;
use crate::pipeline::render::{rasterize_pages, PdfiumRasterizer};
use crate::pipeline::validate;
use crate::request::ConversionRequest;
use crate::workspace::Workspace;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Convert the request's PDF into an image-per-slide deck.
///
/// # Errors
/// Any [`Pdf2DeckError`]; on error no output file remains at the output
/// path and the transient workspace is gone.
pub async fn convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<OutputArtifact, Pdf2DeckError> {
    let total_start = Instant::now();
    info!(
        request = %request.id,
        input = %request.input.display(),
        dpi = request.dpi,
        "Starting conversion"
    );

    // ── Step 1: Parameter bounds — before any I/O ────────────────────────
    validate_parameters(request)?;

    // ── Step 2: Validate paths ───────────────────────────────────────────
    validate::validate_input(&request.input, config.max_upload_bytes)?;
    let output_path = validate::validate_output(&request.output)?;

    // ── Step 3: Acquire the transient workspace (scoped) ─────────────────
    let workspace = Workspace::acquire(config.scratch_dir.as_deref())?;

    let result = assemble(request, config, &workspace, &output_path, total_start).await;

    // ── Step 10: Release the workspace — the one unconditional action ────
    workspace.release();

    match result {
        Ok(artifact) => {
            info!(
                request = %request.id,
                slides = artifact.slides,
                bytes = artifact.bytes,
                total_ms = artifact.stats.total_duration_ms,
                "Conversion complete"
            );
            Ok(artifact)
        }
        Err(e) => {
            // All-or-nothing: a partially written deck must not survive.
            cleanup::remove_quietly(&output_path).await;
            error!(request = %request.id, stage = e.stage(), "Conversion failed: {e}");
            Err(e)
        }
    }
}

/// Steps 4–9: everything that runs inside the workspace scope.
async fn assemble(
    request: &ConversionRequest,
    config: &ConversionConfig,
    workspace: &Workspace,
    output_path: &Path,
    total_start: Instant,
) -> Result<OutputArtifact, Pdf2DeckError> {
    // ── Step 4: Rasterise ────────────────────────────────────────────────
    let rasterizer = config
        .rasterizer
        .clone()
        .unwrap_or_else(|| Arc::new(PdfiumRasterizer));

    let render_start = Instant::now();
    let mut pages = rasterize_pages(rasterizer, &request.input, request.dpi).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let page_count = pages.len();
    if page_count == 0 {
        return Err(Pdf2DeckError::EmptyDocument {
            path: request.input.clone(),
        });
    }
    debug!("Rasterised {page_count} pages in {render_duration_ms}ms");

    // ── Step 5: Apply the page cap (first N, order preserved) ────────────
    if let Some(max_pages) = request.max_pages {
        pages.truncate(max_pages);
    }

    let assemble_start = Instant::now();

    // ── Step 6: Persist page 1, read back its dimensions ─────────────────
    let first_path = workspace.page_path(1);
    pages[0]
        .save(&first_path)
        .map_err(|e| Pdf2DeckError::SlideAssemblyFailed {
            page: 1,
            detail: e.to_string(),
        })?;
    let (width, height) =
        image::image_dimensions(&first_path).map_err(|e| Pdf2DeckError::RasterisationFailed {
            page: 1,
            detail: format!("cannot read back page image: {e}"),
        })?;
    if width == 0 || height == 0 {
        return Err(Pdf2DeckError::DegeneratePageImage {
            page: 1,
            width,
            height,
        });
    }

    // ── Step 7: Resolve the canvas from page 1's aspect ratio ────────────
    let canvas = SlideCanvas::from_first_page(width, height)?;
    debug!(
        "Canvas {:.2}x{:.2} in from {width}x{height} px",
        canvas.width_in, canvas.height_in
    );

    // ── Step 8: Persist each page and append its slide ───────────────────
    let mut deck = DeckBuilder::new(canvas);
    for (i, page) in pages.iter().enumerate() {
        let ordinal = i + 1;
        let page_path = workspace.page_path(ordinal);
        if ordinal > 1 {
            page.save(&page_path)
                .map_err(|e| Pdf2DeckError::SlideAssemblyFailed {
                    page: ordinal,
                    detail: e.to_string(),
                })?;
        }
        deck.add_image_slide(page_path);
    }

    // ── Step 9: Save the package ─────────────────────────────────────────
    let bytes = deck.save(output_path)?;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    Ok(OutputArtifact {
        request_id: request.id,
        path: output_path.to_path_buf(),
        bytes,
        slides: deck.slide_count(),
        canvas,
        stats: ConversionStats {
            page_count,
            slide_count: deck.slide_count(),
            render_duration_ms,
            assemble_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        },
    })
}

/// Step 1: reject out-of-range parameters before touching the disk.
fn validate_parameters(request: &ConversionRequest) -> Result<(), Pdf2DeckError> {
    if !(72..=600).contains(&request.dpi) {
        return Err(Pdf2DeckError::DpiOutOfRange { dpi: request.dpi });
    }
    if request.max_pages == Some(0) {
        return Err(Pdf2DeckError::InvalidPageLimit { limit: 0 });
    }
    Ok(())
}
