//! Parameter bundle for the whole pipeline.

use serde::{Deserialize, Serialize};
use sheet_count_core::{ClusterParams, ParamsError};
use sheet_count_lines::{ContrastParams, EdgeParams, HorizontalFilterParams, HoughParams};

/// Canonical frame size of sequence (video) input.
pub const CANONICAL_WIDTH: u32 = 600;
pub const CANONICAL_HEIGHT: u32 = 400;

/// How the aggregator picks the frame it keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BestFrameRule {
    /// Keep a frame whenever its count is at least the maximum of all
    /// earlier counts; later frames win ties. The first frame is always kept.
    #[default]
    LatestAtMax,
    /// Keep a frame only when its count beats every earlier count.
    FirstAtMax,
}

/// Line overlay settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnotateParams {
    /// RGB color of the drawn lines.
    pub color: [u8; 3],
}

impl Default for AnnotateParams {
    fn default() -> Self {
        Self {
            color: [0, 255, 255],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SequenceParams {
    pub best_frame_rule: BestFrameRule,
}

/// Every tunable of the pipeline, with defaults matching the reference setup.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SheetCountParams {
    pub contrast: ContrastParams,
    pub edges: EdgeParams,
    pub hough: HoughParams,
    pub horizontal: HorizontalFilterParams,
    pub cluster: ClusterParams,
    pub annotate: AnnotateParams,
    pub sequence: SequenceParams,
}

impl SheetCountParams {
    /// Check the values that would otherwise disable a stage at run time.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.hough.validate()?;
        self.cluster.validate()
    }
}
