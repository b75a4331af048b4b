//! Integration tests for the conversion orchestrator.
//!
//! The rasterizer is the one collaborator that needs a native pdfium
//! library, so these tests inject a stub through
//! `ConversionConfig::rasterizer` — the same seam production uses — and
//! exercise everything else for real: validation, workspace lifecycle,
//! canvas geometry, package assembly, and the all-or-nothing failure
//! contract.

use image::{DynamicImage, Rgba, RgbaImage};
use pdf2deck::{convert, ConversionConfig, ConversionRequest, PageRasterizer, Pdf2DeckError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────

/// Fabricates solid-colour pages of the given pixel sizes, or fails on
/// demand. Counts invocations so tests can assert the validator rejected a
/// request before any rasterisation happened.
struct StubRasterizer {
    pages: Vec<(u32, u32)>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubRasterizer {
    fn with_pages(dims: &[(u32, u32)]) -> Arc<Self> {
        Arc::new(Self {
            pages: dims.to_vec(),
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            pages: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageRasterizer for StubRasterizer {
    fn rasterize(&self, _pdf_path: &Path, _dpi: u32) -> Result<Vec<DynamicImage>, Pdf2DeckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Pdf2DeckError::RasterisationFailed {
                page: 2,
                detail: "stub failure on page 2".into(),
            });
        }
        Ok(self
            .pages
            .iter()
            .map(|&(w, h)| {
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([40, 40, 40, 255])))
            })
            .collect())
    }
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Write a file that passes input validation (extension + magic bytes).
    fn write_pdf(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.4\n1 0 obj\nendobj\n").expect("write pdf");
        path
    }

    fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn scratch(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    fn config(&self, rasterizer: Arc<dyn PageRasterizer>) -> ConversionConfig {
        ConversionConfig::builder()
            .scratch_dir(self.scratch())
            .rasterizer(rasterizer)
            .build()
            .expect("valid config")
    }

    /// True when no per-request workspace survived under the scratch root.
    fn scratch_is_empty(&self) -> bool {
        match std::fs::read_dir(self.scratch()) {
            Ok(entries) => entries.count() == 0,
            Err(_) => true,
        }
    }
}

fn archive_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("open pptx");
    let archive = zip::ZipArchive::new(file).expect("read pptx");
    archive.file_names().map(str::to_string).collect()
}

fn read_archive_entry(path: &Path, name: &str) -> String {
    use std::io::Read;
    let file = std::fs::File::open(path).expect("open pptx");
    let mut archive = zip::ZipArchive::new(file).expect("read pptx");
    let mut entry = archive.by_name(name).expect("entry");
    let mut body = String::new();
    entry.read_to_string(&mut body).expect("utf-8 entry");
    body
}

// ── Happy path ───────────────────────────────────────────────────────────

#[tokio::test]
async fn three_pages_become_three_slides() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600), (800, 600), (800, 600)]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"));

    let artifact = convert(&request, &fx.config(stub.clone()))
        .await
        .expect("conversion should succeed");

    assert_eq!(artifact.slides, 3);
    assert_eq!(artifact.stats.page_count, 3);
    assert_eq!(artifact.stats.slide_count, 3);
    assert_eq!(artifact.request_id, request.id);
    assert!(artifact.path.exists());
    assert!(artifact.bytes > 0);
    assert_eq!(stub.call_count(), 1);

    let names = archive_names(&artifact.path);
    assert!(names.contains(&"ppt/slides/slide3.xml".to_string()));
    assert!(names.contains(&"ppt/media/image3.png".to_string()));

    assert!(fx.scratch_is_empty(), "workspace must be gone after return");
}

#[tokio::test]
async fn canvas_height_follows_first_page_aspect() {
    let fx = Fixture::new();
    // 4:3 first page → height = 13.33 × 0.75 in.
    let stub = StubRasterizer::with_pages(&[(800, 600)]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"));

    let artifact = convert(&request, &fx.config(stub)).await.unwrap();

    let expected = 13.33 * (600.0 / 800.0);
    assert!((artifact.canvas.height_in - expected).abs() < 1e-9);

    let presentation = read_archive_entry(&artifact.path, "ppt/presentation.xml");
    assert!(presentation.contains(&format!(r#"cx="{}""#, artifact.canvas.width_emu())));
    assert!(presentation.contains(&format!(r#"cy="{}""#, artifact.canvas.height_emu())));
}

#[tokio::test]
async fn later_pages_stretch_to_first_page_canvas() {
    let fx = Fixture::new();
    // Page 2 has a wildly different aspect ratio; the canvas still comes
    // from page 1 and page 2 is stretched onto it.
    let stub = StubRasterizer::with_pages(&[(1000, 1000), (2000, 500)]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"));

    let artifact = convert(&request, &fx.config(stub)).await.unwrap();

    assert_eq!(artifact.canvas.width_emu(), artifact.canvas.height_emu());
    let slide2 = read_archive_entry(&artifact.path, "ppt/slides/slide2.xml");
    assert!(slide2.contains(&format!(
        r#"<a:ext cx="{}" cy="{}"/>"#,
        artifact.canvas.width_emu(),
        artifact.canvas.height_emu()
    )));
}

#[tokio::test]
async fn page_cap_keeps_first_pages_in_order() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600), (800, 600), (800, 600)]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"))
        .with_dpi(150)
        .with_max_pages(2);

    let artifact = convert(&request, &fx.config(stub)).await.unwrap();

    assert_eq!(artifact.slides, 2);
    assert_eq!(artifact.stats.page_count, 3);
    assert_eq!(artifact.stats.slide_count, 2);

    let names = archive_names(&artifact.path);
    assert!(names.contains(&"ppt/slides/slide2.xml".to_string()));
    assert!(!names.contains(&"ppt/slides/slide3.xml".to_string()));
}

#[tokio::test]
async fn output_extension_is_normalised_to_pptx() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600)]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.bin"));

    let artifact = convert(&request, &fx.config(stub)).await.unwrap();

    assert_eq!(artifact.path, fx.output("deck.pptx"));
    assert!(artifact.path.exists());
    assert!(!fx.output("deck.bin").exists());
}

// ── Rejection before any expensive work ──────────────────────────────────

#[tokio::test]
async fn out_of_range_dpi_is_rejected_before_any_io() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600)]);
    let config = fx.config(stub.clone());

    for dpi in [71, 601] {
        let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"))
            .with_dpi(dpi);
        let result = convert(&request, &config).await;
        assert!(matches!(result, Err(Pdf2DeckError::DpiOutOfRange { .. })));
    }

    assert_eq!(stub.call_count(), 0, "rasterizer must never be invoked");
    assert!(!fx.output("deck.pptx").exists());
    assert!(fx.scratch_is_empty());
}

#[tokio::test]
async fn zero_page_cap_is_rejected_before_any_io() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600)]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"))
        .with_max_pages(0);

    let result = convert(&request, &fx.config(stub.clone())).await;

    assert!(matches!(
        result,
        Err(Pdf2DeckError::InvalidPageLimit { limit: 0 })
    ));
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn empty_upload_is_rejected_before_rasterisation() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600)]);
    let empty = fx.dir.path().join("empty.pdf");
    std::fs::write(&empty, b"").unwrap();
    let request = ConversionRequest::new(empty, fx.output("deck.pptx"));

    let result = convert(&request, &fx.config(stub.clone())).await;

    assert!(matches!(result, Err(Pdf2DeckError::EmptyUpload { .. })));
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn wrong_extension_is_rejected_before_rasterisation() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600)]);
    let path = fx.dir.path().join("doc.txt");
    std::fs::write(&path, b"%PDF-1.4\n").unwrap();
    let request = ConversionRequest::new(path, fx.output("deck.pptx"));

    let result = convert(&request, &fx.config(stub.clone())).await;

    assert!(matches!(result, Err(Pdf2DeckError::WrongExtension { .. })));
    assert_eq!(stub.call_count(), 0);
}

// ── Failure leaves nothing behind ────────────────────────────────────────

#[tokio::test]
async fn rasterizer_failure_leaves_no_artifacts() {
    let fx = Fixture::new();
    let stub = StubRasterizer::failing();
    let input = fx.write_pdf("doc.pdf");
    let request = ConversionRequest::new(input.clone(), fx.output("deck.pptx"));

    let result = convert(&request, &fx.config(stub)).await;

    assert!(matches!(
        result,
        Err(Pdf2DeckError::RasterisationFailed { page: 2, .. })
    ));
    assert!(!fx.output("deck.pptx").exists(), "no partial output");
    assert!(fx.scratch_is_empty(), "workspace removed on failure");
    // The orchestrator does not own the input; the caller's scheduler does.
    assert!(input.exists());
}

#[tokio::test]
async fn zero_pages_is_an_empty_document() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"));

    let result = convert(&request, &fx.config(stub)).await;

    assert!(matches!(result, Err(Pdf2DeckError::EmptyDocument { .. })));
    assert!(fx.scratch_is_empty());
}

// ── Cleanup idempotency ──────────────────────────────────────────────────

#[tokio::test]
async fn deleting_the_output_twice_is_a_noop() {
    let fx = Fixture::new();
    let stub = StubRasterizer::with_pages(&[(800, 600)]);
    let request = ConversionRequest::new(fx.write_pdf("doc.pdf"), fx.output("deck.pptx"));

    let artifact = convert(&request, &fx.config(stub)).await.unwrap();
    assert!(artifact.path.exists());

    pdf2deck::cleanup::remove_quietly(&artifact.path).await;
    assert!(!artifact.path.exists());
    // Second deletion of the same path must be silent.
    pdf2deck::cleanup::remove_quietly(&artifact.path).await;
}
