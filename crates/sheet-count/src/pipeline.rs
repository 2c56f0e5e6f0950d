//! Single-frame pipeline: contrast → edges → lines → clusters → overlay.

use crate::annotate::draw_lines;
use crate::SheetCountParams;
use log::debug;
use sheet_count_core::{
    cluster_lines, ClusterAssignment, FrameError, HorizontalLine, LineSegment, RgbFrame,
};
use sheet_count_lines::{adjust_contrast, detect_edges, extract_segments, filter_horizontal};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Outcome of processing one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    /// Number of sheet-boundary clusters.
    pub sheet_count: usize,
    /// Copy of the input frame with the horizontal lines drawn on it.
    pub annotated: RgbFrame,
    /// Edge pixels left after hysteresis.
    pub edge_pixels: usize,
    /// All segments returned by the line extractor.
    pub segments: Vec<LineSegment>,
    /// Segments that passed the horizontal filter.
    pub horizontal: Vec<HorizontalLine>,
    /// Midpoint-y of every horizontal line, in `horizontal` order.
    pub midpoints: Vec<i32>,
    pub assignment: ClusterAssignment,
}

/// Runs the full per-frame pipeline with a fixed parameter set.
#[derive(Clone, Debug, Default)]
pub struct SheetCounter {
    params: SheetCountParams,
}

impl SheetCounter {
    pub fn new(params: SheetCountParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SheetCountParams {
        &self.params
    }

    /// Count sheet boundaries in one frame.
    ///
    /// A frame without detectable edges yields a count of 0 and an annotated
    /// copy identical to the input.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn count(&self, frame: &RgbFrame) -> FrameResult {
        let p = &self.params;
        let adjusted = adjust_contrast(&frame.view(), &p.contrast);
        let edges = detect_edges(&adjusted.view(), &p.edges);
        let segments = extract_segments(&edges, &p.hough);
        let horizontal = filter_horizontal(&segments, &p.horizontal);
        let midpoints: Vec<i32> = horizontal.iter().map(HorizontalLine::midpoint_y).collect();
        let assignment = cluster_lines(&horizontal, &p.cluster);
        let annotated = draw_lines(frame, &horizontal, &p.annotate);

        debug!(
            "frame {}x{}: {} edge px, {} segments, {} horizontal, {} sheets",
            frame.width(),
            frame.height(),
            edges.edge_count(),
            segments.len(),
            horizontal.len(),
            assignment.sheet_count()
        );

        FrameResult {
            sheet_count: assignment.sheet_count(),
            annotated,
            edge_pixels: edges.edge_count(),
            segments,
            horizontal,
            midpoints,
            assignment,
        }
    }

    /// Validate a raw interleaved buffer and count it.
    ///
    /// Zero dimensions, a channel count other than 3 and length mismatches
    /// are rejected with [`FrameError`].
    pub fn count_raw(
        &self,
        width: usize,
        height: usize,
        channels: usize,
        data: &[u8],
    ) -> Result<FrameResult, FrameError> {
        let frame = RgbFrame::from_raw_channels(width, height, channels, data)?;
        Ok(self.count(&frame))
    }
}
