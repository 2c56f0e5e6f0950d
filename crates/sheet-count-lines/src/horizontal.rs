//! Horizontal-segment filter.

use serde::{Deserialize, Serialize};
use sheet_count_core::{HorizontalLine, LineSegment};

/// Tolerance for accepting a segment as horizontal.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HorizontalFilterParams {
    /// Endpoints must differ vertically by strictly less than this many pixels.
    pub tolerance_px: i32,
}

impl Default for HorizontalFilterParams {
    fn default() -> Self {
        Self { tolerance_px: 2 }
    }
}

/// Keep the segments whose endpoints are nearly level, in input order.
pub fn filter_horizontal(
    segments: &[LineSegment],
    params: &HorizontalFilterParams,
) -> Vec<HorizontalLine> {
    segments
        .iter()
        .filter_map(|s| s.as_horizontal(params.tolerance_px))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_level_segments_in_order() {
        let segments = [
            LineSegment::new(0, 50, 300, 51),
            LineSegment::new(10, 10, 10, 200),
            LineSegment::new(0, 80, 250, 82),
            LineSegment::new(300, 120, 0, 120),
        ];
        let kept = filter_horizontal(&segments, &HorizontalFilterParams::default());
        let kept: Vec<_> = kept.iter().map(|l| *l.segment()).collect();
        assert_eq!(kept, vec![segments[0], segments[3]]);
    }

    #[test]
    fn zero_tolerance_rejects_everything() {
        let segments = [LineSegment::new(0, 5, 100, 5)];
        let params = HorizontalFilterParams { tolerance_px: 0 };
        assert!(filter_horizontal(&segments, &params).is_empty());
    }
}
