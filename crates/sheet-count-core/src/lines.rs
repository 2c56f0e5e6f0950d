use serde::{Deserialize, Serialize};

/// Straight segment in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Vertical spread between the two endpoints.
    #[inline]
    pub fn dy(&self) -> i32 {
        (self.y1 - self.y2).abs()
    }

    #[inline]
    pub fn dx(&self) -> i32 {
        (self.x1 - self.x2).abs()
    }

    /// `Some` when the endpoints differ vertically by less than `tolerance_px`.
    pub fn as_horizontal(&self, tolerance_px: i32) -> Option<HorizontalLine> {
        (self.dy() < tolerance_px).then_some(HorizontalLine(*self))
    }
}

/// A segment accepted by the horizontal-tolerance rule.
///
/// Only [`HorizontalLine::midpoint_y`] is used for clustering; the full
/// segment is kept for annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HorizontalLine(LineSegment);

impl HorizontalLine {
    #[inline]
    pub fn segment(&self) -> &LineSegment {
        &self.0
    }

    /// `⌊(y1 + y2) / 2⌋`.
    #[inline]
    pub fn midpoint_y(&self) -> i32 {
        (self.0.y1 + self.0.y2).div_euclid(2)
    }
}
