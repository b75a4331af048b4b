//! Result types returned by a successful conversion.

use crate::pipeline::geometry::SlideCanvas;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// The generated presentation file.
///
/// The artifact outlives the orchestrator — it has to survive long enough
/// to be streamed in the response — but from that point on it belongs to
/// the cleanup scheduler, which is the only code allowed to delete it.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// Identifier of the request that produced this file.
    pub request_id: Uuid,
    /// Where the presentation was written.
    pub path: PathBuf,
    /// Package size in bytes.
    pub bytes: u64,
    /// Number of slides in the deck.
    pub slides: usize,
    /// Canvas the slides were sized to.
    pub canvas: SlideCanvas,
    /// Timing breakdown for this conversion.
    pub stats: ConversionStats,
}

/// Per-stage timing and size statistics for one conversion.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ConversionStats {
    /// Pages the rasterizer produced (before any page cap).
    pub page_count: usize,
    /// Slides written to the deck (after the page cap).
    pub slide_count: usize,
    /// Time spent rasterising, in milliseconds.
    pub render_duration_ms: u64,
    /// Time spent persisting pages and assembling the package, in milliseconds.
    pub assemble_duration_ms: u64,
    /// Wall-clock time for the whole conversion, in milliseconds.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_to_json() {
        let stats = ConversionStats {
            page_count: 3,
            slide_count: 2,
            render_duration_ms: 120,
            assemble_duration_ms: 40,
            total_duration_ms: 170,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"slide_count\":2"));
        assert!(json.contains("\"total_duration_ms\":170"));
    }
}
