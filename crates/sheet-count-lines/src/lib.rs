//! Line extraction stages of the sheet-counting pipeline.
//!
//! Contrast adjustment, Canny-style edge detection, a progressive
//! probabilistic Hough transform and the horizontal filter. Every stage is a
//! pure function of its input and a serde-friendly params struct.
//!
//! ```
//! use sheet_count_core::RgbFrame;
//! use sheet_count_lines::{
//!     adjust_contrast, detect_edges, extract_segments, filter_horizontal, ContrastParams,
//!     EdgeParams, HorizontalFilterParams, HoughParams,
//! };
//!
//! let frame = RgbFrame::filled(64, 48, [90, 90, 90]).unwrap();
//! let adjusted = adjust_contrast(&frame.view(), &ContrastParams::default());
//! let edges = detect_edges(&adjusted.view(), &EdgeParams::default());
//! let segments = extract_segments(&edges, &HoughParams::default());
//! assert!(filter_horizontal(&segments, &HorizontalFilterParams::default()).is_empty());
//! ```

mod contrast;
mod edges;
mod horizontal;
mod hough;

pub use contrast::{adjust_contrast, ContrastParams};
pub use edges::{detect_edges, detect_edges_gray, sobel_gradients, EdgeParams, Gradients};
pub use horizontal::{filter_horizontal, HorizontalFilterParams};
pub use hough::{extract_segments, HoughParams};
