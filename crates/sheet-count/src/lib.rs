//! Count stacked paper sheets from the horizontal edges visible on their side.
//!
//! This crate provides:
//! - re-exports of the lower crates (`sheet_count::core`, `sheet_count::lines`)
//! - [`SheetCounter`], the per-frame pipeline: contrast → Canny edges →
//!   probabilistic Hough → horizontal filter → 1-D DBSCAN → line overlay
//! - [`SequenceAggregator`], which runs the pipeline over a frame sequence and
//!   keeps the maximum count with its annotated frame
//! - JSON config/report helpers and (feature `image`) file adapters.
//!
//! ## Quickstart
//!
//! ```
//! use sheet_count::{RgbFrame, SheetCounter};
//!
//! let frame = RgbFrame::filled(120, 80, [200, 200, 200]).unwrap();
//! let result = SheetCounter::default().count(&frame);
//! assert_eq!(result.sheet_count, 0);
//! assert_eq!(result.annotated, frame);
//! ```
//!
//! Raw buffers from an external decoder go through [`SheetCounter::count_raw`],
//! which rejects malformed layouts instead of guessing.
//!
//! ## Features
//! - `image` (default): decode/encode/resize helpers in [`image_io`].
//! - `cli` (default): the `sheet-count` binary.
//! - `tracing`: `#[instrument]` spans on the pipeline stages.

pub use sheet_count_core as core;
pub use sheet_count_lines as lines;

pub use sheet_count_core::{
    init_with_level, level_for_verbosity, ClusterAssignment, ClusterLabel, ClusterParams,
    FrameError, HorizontalLine, LineSegment, ParamsError, RgbFrame, RgbFrameView,
};
pub use sheet_count_lines::{ContrastParams, EdgeParams, HorizontalFilterParams, HoughParams};

#[cfg(feature = "tracing")]
pub use sheet_count_core::{init_tracing, init_tracing_with_level};

mod annotate;
mod io;
mod params;
mod pipeline;
mod sequence;

#[cfg(feature = "image")]
pub mod image_io;

pub use annotate::{draw_lines, draw_segment};
pub use io::{FrameReport, SheetCountConfig, SheetCountIoError, SheetCountReport};
pub use params::{
    AnnotateParams, BestFrameRule, SequenceParams, SheetCountParams, CANONICAL_HEIGHT,
    CANONICAL_WIDTH,
};
pub use pipeline::{FrameResult, SheetCounter};
pub use sequence::{CancelToken, FrameSource, RunResult, SequenceAggregator};
