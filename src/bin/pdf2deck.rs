//! HTTP server binary for pdf2deck.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServiceConfig` and serves the axum router.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2deck::server::{router, ServiceConfig};
use pdf2deck::{CleanupConfig, ConversionConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address with default directories
  pdf2deck

  # Production-ish: bigger uploads, dedicated directories
  pdf2deck --bind 0.0.0.0:8080 \
           --upload-dir /var/lib/pdf2deck/uploads \
           --output-dir /var/lib/pdf2deck/converted \
           --max-upload-mb 100

  # Convert via curl
  curl -F pdf=@document.pdf -F dpi=150 -F max_pages=20 \
       -o document.pptx http://localhost:8080/convert

CLEANUP:
  Uploaded PDFs and generated decks are transient. Each request schedules
  an immediate deletion (--grace-secs after the response) and a delayed
  fallback deletion (--fallback-secs). Landing-page loads additionally
  sweep both directories for files older than --sweep-max-age-secs, which
  catches artifacts orphaned by a crash.

ENVIRONMENT VARIABLES:
  PDF2DECK_BIND        Listen address (same as --bind)
  PDF2DECK_DPI         Default rendering DPI (same as --dpi)
  PDFIUM_LIB_PATH      Path to an existing libpdfium shared library
"#;

/// Serve PDF → image-per-slide PowerPoint conversion over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2deck",
    version,
    about = "Serve PDF → image-per-slide PowerPoint conversion over HTTP",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "PDF2DECK_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Directory uploaded PDFs are saved into.
    #[arg(long, env = "PDF2DECK_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Directory generated decks are written into.
    #[arg(long, env = "PDF2DECK_OUTPUT_DIR", default_value = "converted")]
    output_dir: PathBuf,

    /// Scratch directory for per-request workspaces (default: system temp).
    #[arg(long, env = "PDF2DECK_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Default rendering DPI when the upload form does not set one (72–600).
    #[arg(long, env = "PDF2DECK_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Cap on converted pages when the upload form does not set one.
    #[arg(long, env = "PDF2DECK_MAX_PAGES")]
    max_pages: Option<usize>,

    /// Maximum upload size in MiB.
    #[arg(long, env = "PDF2DECK_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: u64,

    /// Grace interval before the post-response deletion, in seconds.
    #[arg(long, env = "PDF2DECK_GRACE_SECS", default_value_t = 10)]
    grace_secs: u64,

    /// Delay before the fallback deletion, in seconds.
    #[arg(long, env = "PDF2DECK_FALLBACK_SECS", default_value_t = 600)]
    fallback_secs: u64,

    /// Age past which a sweep removes an orphaned artifact, in seconds.
    #[arg(long, env = "PDF2DECK_SWEEP_MAX_AGE_SECS", default_value_t = 3600)]
    sweep_max_age_secs: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2DECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2DECK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut conversion = ConversionConfig::builder()
        .max_upload_bytes(cli.max_upload_mb * 1024 * 1024)
        .build()
        .context("Invalid configuration")?;
    conversion.scratch_dir = cli.scratch_dir.clone();

    let config = ServiceConfig {
        upload_dir: cli.upload_dir.clone(),
        output_dir: cli.output_dir.clone(),
        default_dpi: cli.dpi,
        default_max_pages: cli.max_pages,
        conversion,
        cleanup: CleanupConfig {
            immediate_grace: Duration::from_secs(cli.grace_secs),
            fallback_delay: Duration::from_secs(cli.fallback_secs),
            sweep_max_age: Duration::from_secs(cli.sweep_max_age_secs),
        },
    };

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot create upload dir {:?}", config.upload_dir))?;
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Cannot create output dir {:?}", config.output_dir))?;

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Cannot bind {}", cli.bind))?;
    tracing::info!("Listening on http://{}", cli.bind);

    axum::serve(listener, router(config))
        .await
        .context("Server error")?;

    Ok(())
}
