//! Cleanup scheduling: guaranteed eventual removal of request artifacts.
//!
//! Three independent mechanisms cover the artifacts that outlive the
//! conversion itself (the saved upload and the generated deck):
//!
//! * [`schedule_immediate`] — fires shortly after the response is sent; the
//!   grace interval exists so the file is not deleted mid-transfer.
//! * [`schedule_fallback`] — a second, much later deletion of the same
//!   paths, in case the immediate task never ran to completion.
//! * [`sweep`] — an age-based scan of a whole directory, catching files
//!   orphaned by a crash between scheduling and execution.
//!
//! The tasks are unordered relative to each other and may target the same
//! paths; [`remove_quietly`] makes the race harmless by treating an
//! already-deleted file as success. No cleanup failure is ever surfaced to
//! a request — each is caught, logged, and iteration continues.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Timing knobs for the three cleanup mechanisms.
#[derive(Debug, Clone, Copy)]
pub struct CleanupConfig {
    /// Delay before the post-response deletion; long enough for the
    /// transfer to finish. Default: 10 s.
    pub immediate_grace: Duration,
    /// Delay before the safety-net deletion. Default: 10 min.
    pub fallback_delay: Duration,
    /// Age past which a sweep removes a file. Default: 1 h.
    pub sweep_max_age: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            immediate_grace: Duration::from_secs(10),
            fallback_delay: Duration::from_secs(600),
            sweep_max_age: Duration::from_secs(3600),
        }
    }
}

/// Delete `paths` after a short grace interval, as a background task.
pub fn schedule_immediate(paths: Vec<PathBuf>, grace: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        remove_all(&paths).await;
    })
}

/// Delete `paths` after a long delay, as an independent safety net.
pub fn schedule_fallback(paths: Vec<PathBuf>, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        remove_all(&paths).await;
    })
}

/// Delete every path in the list; failures are logged, never returned.
pub async fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        remove_quietly(path).await;
    }
}

/// Idempotent single-file deletion: an already-missing file is a silent
/// no-op, any other failure is a warning.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {e}", path.display()),
    }
}

/// Non-recursive sweep: delete regular files in `dir` whose modification
/// time is older than `max_age`. Returns the number of files removed.
/// Individual file errors never abort the scan.
pub async fn sweep(dir: &Path, max_age: Duration) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Sweep cannot read {}: {e}", dir.display());
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Sweep iteration error in {}: {e}", dir.display());
                break;
            }
        };

        let path = entry.path();
        let meta = match entry.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Sweep cannot stat {}: {e}", path.display());
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }

        let expired = meta
            .modified()
            .ok()
            .and_then(|mtime| mtime.elapsed().ok())
            .map(|age| age >= max_age)
            .unwrap_or(false);
        if !expired {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Swept {}", path.display());
                removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Sweep failed to remove {}: {e}", path.display()),
        }
    }

    if removed > 0 {
        debug!("Sweep removed {removed} file(s) from {}", dir.display());
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remove_quietly_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.pptx");
        std::fs::write(&path, b"deck").unwrap();

        remove_quietly(&path).await;
        assert!(!path.exists());
        // Second call on the now-missing path must be a silent no-op.
        remove_quietly(&path).await;
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_deletes_after_grace() {
        let dir = tempfile::tempdir().unwrap();
        let upload = dir.path().join("in.pdf");
        let deck = dir.path().join("out.pptx");
        std::fs::write(&upload, b"pdf").unwrap();
        std::fs::write(&deck, b"deck").unwrap();

        schedule_immediate(
            vec![upload.clone(), deck.clone()],
            Duration::from_secs(10),
        )
        .await
        .unwrap();

        assert!(!upload.exists());
        assert!(!deck.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_and_fallback_race_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.pptx");
        std::fs::write(&path, b"deck").unwrap();

        let immediate = schedule_immediate(vec![path.clone()], Duration::from_secs(10));
        let fallback = schedule_fallback(vec![path.clone()], Duration::from_secs(600));

        immediate.await.unwrap();
        fallback.await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("stale.pptx");
        std::fs::write(&stale, b"old").unwrap();

        // With a zero max-age everything qualifies; with a huge one nothing does.
        let removed = sweep(dir.path(), Duration::from_secs(3600)).await;
        assert_eq!(removed, 0);
        assert!(stale.exists());

        let removed = sweep(dir.path(), Duration::ZERO).await;
        assert_eq!(removed, 1);
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn sweep_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        let removed = sweep(dir.path(), Duration::ZERO).await;
        assert_eq!(removed, 0);
        assert!(dir.path().join("subdir").is_dir());
    }

    #[tokio::test]
    async fn sweep_of_missing_directory_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let removed = sweep(&dir.path().join("nope"), Duration::ZERO).await;
        assert_eq!(removed, 0);
    }
}
