//! Core types for counting stacked sheets in images.
//!
//! This crate holds the data model shared by the pipeline stages (frames,
//! edge maps, line segments) and the 1-D density clustering that turns
//! horizontal line positions into a sheet count. It has no image-decoding
//! dependency.

mod clustering;
mod error;
mod image;
mod lines;
mod logger;

pub use clustering::{
    cluster_lines, cluster_midpoints, ClusterAssignment, ClusterLabel, ClusterParams,
};
pub use error::{FrameError, ParamsError};
pub use image::{EdgeMap, GrayImage, RgbFrame, RgbFrameView, FRAME_CHANNELS};
pub use lines::{HorizontalLine, LineSegment};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, init_tracing_with_level};

pub use logger::{init_with_level, level_for_verbosity};
