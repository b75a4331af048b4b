//! Transient workspace: a disposable directory for one request's page images.
//!
//! ## Why tempfile?
//!
//! `tempfile::Builder` creates a uniquely named directory with restrictive
//! permissions (0700 on Unix), and its `TempDir` guard removes the whole
//! tree on `Drop`. That drop is the structural guarantee the pipeline
//! relies on: whether the conversion returns normally, bails out with `?`,
//! or panics, the directory and every page image inside it are gone by the
//! time the orchestrator's caller resumes. [`Workspace::release`] exists on
//! top of `Drop` so the normal path can log a removal failure — a locked
//! file must produce a warning, never replace the conversion outcome.

use crate::error::Pdf2DeckError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Scoped handle to one request's transient directory.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a uniquely named workspace directory. `scratch_root` selects
    /// the parent directory; `None` uses the system temp directory.
    pub fn acquire(scratch_root: Option<&Path>) -> Result<Self, Pdf2DeckError> {
        let dir = match scratch_root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| Pdf2DeckError::WorkspaceFailed {
                    detail: format!("cannot create scratch root '{}': {e}", root.display()),
                })?;
                tempfile::Builder::new().prefix("pdf2deck-").tempdir_in(root)
            }
            None => tempfile::Builder::new().prefix("pdf2deck-").tempdir(),
        }
        .map_err(|e| Pdf2DeckError::WorkspaceFailed {
            detail: e.to_string(),
        })?;

        debug!("Acquired workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Mint the path for the page with the given 1-based ordinal.
    pub fn page_path(&self, ordinal: usize) -> PathBuf {
        self.dir.path().join(format!("page_{ordinal:04}.png"))
    }

    /// Remove the directory and everything in it. Removal failure is logged
    /// and swallowed — it must never mask the conversion outcome.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove workspace {}: {e}", path.display());
        } else {
            debug!("Released workspace {}", path.display());
        }
    }
}
