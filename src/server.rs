//! HTTP shell around the conversion pipeline (feature `server`).
//!
//! Deliberately thin: the handlers save the upload under a request-unique
//! name, call [`crate::convert::convert`], stream the deck back as an
//! attachment, and hand both artifacts to the cleanup scheduler. All
//! conversion semantics live in the library; everything here is transport.
//!
//! Status mapping: upload-too-large → 413, other validation/parameter
//! errors → 400 with the specific message, anything else → 500 with a
//! generic body (the specific stage and cause are already in the log).

use crate::cleanup::{self, CleanupConfig};
use crate::config::ConversionConfig;
use crate::convert;
use crate::error::Pdf2DeckError;
use crate::request::ConversionRequest;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// MIME type of the generated deck.
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Everything the HTTP layer needs to run.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory uploads are saved into (one `{uuid}.pdf` per request).
    pub upload_dir: PathBuf,
    /// Directory decks are written into (one `{uuid}.pptx` per request).
    pub output_dir: PathBuf,
    /// DPI applied when the form does not carry a `dpi` field.
    pub default_dpi: u32,
    /// Page cap applied when the form does not carry a `max_pages` field.
    pub default_max_pages: Option<usize>,
    pub conversion: ConversionConfig,
    pub cleanup: CleanupConfig,
}

/// Build the application router.
pub fn router(config: ServiceConfig) -> Router {
    // The multipart envelope adds a little framing on top of the PDF itself.
    let body_limit = config.conversion.max_upload_bytes as usize + 64 * 1024;
    let state = Arc::new(config);

    Router::new()
        .route("/", get(index))
        .route("/convert", post(convert_handler))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Handlers ─────────────────────────────────────────────────────────────

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>pdf2deck</title></head>
<body>
<h1>PDF &rarr; PowerPoint</h1>
<form action="/convert" method="post" enctype="multipart/form-data">
  <p><input type="file" name="pdf" accept="application/pdf" required></p>
  <p><label>DPI <input type="number" name="dpi" value="300" min="72" max="600"></label></p>
  <p><label>Max pages <input type="number" name="max_pages" min="1" placeholder="all"></label></p>
  <p><button type="submit">Convert</button></p>
</form>
</body>
</html>
"#;

/// Landing page. Each load also sweeps both artifact directories for
/// orphans left behind by a crash between scheduling and execution.
async fn index(State(state): State<Arc<ServiceConfig>>) -> Html<&'static str> {
    let upload_dir = state.upload_dir.clone();
    let output_dir = state.output_dir.clone();
    let max_age = state.cleanup.sweep_max_age;
    tokio::spawn(async move {
        cleanup::sweep(&upload_dir, max_age).await;
        cleanup::sweep(&output_dir, max_age).await;
    });

    Html(INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /convert` — multipart form: `pdf` file field (required), optional
/// `dpi` and `max_pages` text fields.
async fn convert_handler(
    State(state): State<Arc<ServiceConfig>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut pdf: Option<(String, axum::body::Bytes)> = None;
    let mut dpi = state.default_dpi;
    let mut max_pages = state.default_max_pages;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf" => {
                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                pdf = Some((filename, data));
            }
            "dpi" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim().to_string();
                if !text.is_empty() {
                    dpi = text.parse().map_err(|_| {
                        ApiError::new(StatusCode::BAD_REQUEST, format!("invalid dpi '{text}'"))
                    })?;
                }
            }
            "max_pages" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim().to_string();
                if !text.is_empty() {
                    max_pages = Some(text.parse().map_err(|_| {
                        ApiError::new(
                            StatusCode::BAD_REQUEST,
                            format!("invalid max_pages '{text}'"),
                        )
                    })?);
                }
            }
            _ => {}
        }
    }

    let (original_name, data) = pdf.ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, "missing 'pdf' file field".into())
    })?;

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(io_error)?;
    tokio::fs::create_dir_all(&state.output_dir)
        .await
        .map_err(io_error)?;

    // The request id is baked into both filenames; concurrent requests can
    // never collide.
    let mut request =
        ConversionRequest::in_dirs(&state.upload_dir, &state.output_dir).with_dpi(dpi);
    if let Some(n) = max_pages {
        request = request.with_max_pages(n);
    }

    tokio::fs::write(&request.input, &data)
        .await
        .map_err(io_error)?;

    let artifact = match convert::convert(&request, &state.conversion).await {
        Ok(artifact) => artifact,
        Err(e) => {
            // No deck was produced; the saved upload must not outlive the
            // failed request either.
            cleanup::remove_quietly(&request.input).await;
            return Err(ApiError::from(e));
        }
    };

    let body = tokio::fs::read(&artifact.path).await.map_err(io_error)?;

    // From here on both artifacts belong to the cleanup scheduler: one
    // deletion shortly after the transfer, one delayed safety net.
    let targets = vec![request.input.clone(), artifact.path.clone()];
    cleanup::schedule_immediate(targets.clone(), state.cleanup.immediate_grace);
    cleanup::schedule_fallback(targets, state.cleanup.fallback_delay);

    let headers = [
        (header::CONTENT_TYPE, PPTX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                attachment_filename(&original_name)
            ),
        ),
    ];
    Ok((headers, body).into_response())
}

// ── Error mapping ────────────────────────────────────────────────────────

/// A user-facing error response: `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Pdf2DeckError> for ApiError {
    fn from(e: Pdf2DeckError) -> Self {
        // convert() already logged the stage and cause for pipeline errors.
        match &e {
            Pdf2DeckError::UploadTooLarge { .. } => {
                ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
            }
            _ if e.is_client_error() => ApiError::new(StatusCode::BAD_REQUEST, e.to_string()),
            _ => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "conversion failed".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, format!("malformed upload: {e}"))
}

fn io_error(e: std::io::Error) -> ApiError {
    warn!("Request I/O failed: {e}");
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "conversion failed".into(),
    )
}

// ── Attachment filename ──────────────────────────────────────────────────

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Derive the download filename from the uploaded file's base name, with
/// the output extension substituted and header-unsafe characters replaced.
fn attachment_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let safe = UNSAFE_CHARS.replace_all(stem, "_");
    let safe = safe.trim_matches('_');
    if safe.is_empty() {
        "document.pptx".to_string()
    } else {
        format!("{safe}.pptx")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_name_substitutes_extension() {
        assert_eq!(attachment_filename("report.pdf"), "report.pptx");
        assert_eq!(attachment_filename("slides"), "slides.pptx");
    }

    #[test]
    fn attachment_name_is_sanitised() {
        assert_eq!(
            attachment_filename("q3 report (final).pdf"),
            "q3_report_final.pptx"
        );
        assert_eq!(attachment_filename("../../etc/passwd"), "passwd.pptx");
        assert_eq!(attachment_filename("\"quoted\".pdf"), "quoted.pptx");
    }

    #[test]
    fn attachment_name_falls_back_for_garbage() {
        assert_eq!(attachment_filename("???.pdf"), "document.pptx");
        assert_eq!(attachment_filename(""), "document.pptx");
    }

    #[test]
    fn status_mapping_follows_taxonomy() {
        let e = Pdf2DeckError::UploadTooLarge {
            path: "a.pdf".into(),
            size: 2,
            limit: 1,
        };
        assert_eq!(ApiError::from(e).status(), StatusCode::PAYLOAD_TOO_LARGE);

        let e = Pdf2DeckError::DpiOutOfRange { dpi: 71 };
        assert_eq!(ApiError::from(e).status(), StatusCode::BAD_REQUEST);

        let e = Pdf2DeckError::RasterisationFailed {
            page: 1,
            detail: "x".into(),
        };
        let api = ApiError::from(e);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Pipeline detail stays in the log, not in the response body.
        assert_eq!(api.message, "conversion failed");
    }
}
