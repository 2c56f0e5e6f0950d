//! Adapters between `image` buffers and [`RgbFrame`], plus a still-image
//! frame source.

use crate::{FrameResult, SheetCounter, CANONICAL_HEIGHT, CANONICAL_WIDTH};
use ::image::imageops::{self, FilterType};
use ::image::RgbImage;
use log::{debug, warn};
use sheet_count_core::{FrameError, RgbFrame};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ImageSourceError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("invalid scale factor {0}")]
    InvalidScale(f32),
}

/// Copy an `image::RgbImage` into a validated frame.
pub fn frame_from_image(img: &RgbImage) -> Result<RgbFrame, FrameError> {
    RgbFrame::from_raw(
        img.width() as usize,
        img.height() as usize,
        img.as_raw().clone(),
    )
}

/// Copy a frame into an `image::RgbImage`.
pub fn frame_to_image(frame: &RgbFrame) -> RgbImage {
    let mut img = RgbImage::new(frame.width() as u32, frame.height() as u32);
    img.copy_from_slice(frame.data());
    img
}

/// Decode an image file of any supported format into an RGB frame.
pub fn load_frame(path: impl AsRef<Path>) -> Result<RgbFrame, ImageSourceError> {
    let img = ::image::open(path.as_ref())?.to_rgb8();
    Ok(frame_from_image(&img)?)
}

/// Encode a frame; the format follows the file extension.
pub fn save_frame(frame: &RgbFrame, path: impl AsRef<Path>) -> Result<(), ImageSourceError> {
    frame_to_image(frame).save(path.as_ref())?;
    Ok(())
}

/// Bilinear resize.
pub fn resize_frame(frame: &RgbFrame, width: u32, height: u32) -> Result<RgbFrame, ImageSourceError> {
    if width == 0 || height == 0 {
        return Err(FrameError::ZeroDimensions {
            width: width as usize,
            height: height as usize,
        }
        .into());
    }
    if (frame.width() as u32, frame.height() as u32) == (width, height) {
        return Ok(frame.clone());
    }
    let resized = imageops::resize(&frame_to_image(frame), width, height, FilterType::Triangle);
    Ok(frame_from_image(&resized)?)
}

/// Resize to the canonical 600×400 sequence size.
pub fn to_canonical(frame: &RgbFrame) -> Result<RgbFrame, ImageSourceError> {
    resize_frame(frame, CANONICAL_WIDTH, CANONICAL_HEIGHT)
}

/// Scale both dimensions by `factor` for display (0.33 for still images).
///
/// Each side is at least one pixel.
pub fn scale_for_display(frame: &RgbFrame, factor: f32) -> Result<RgbFrame, ImageSourceError> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(ImageSourceError::InvalidScale(factor));
    }
    let w = ((frame.width() as f32 * factor).round() as u32).max(1);
    let h = ((frame.height() as f32 * factor).round() as u32).max(1);
    resize_frame(frame, w, h)
}

/// Count a still image at its native resolution.
pub fn count_image_file(
    path: impl AsRef<Path>,
    counter: &SheetCounter,
) -> Result<FrameResult, ImageSourceError> {
    let frame = load_frame(path)?;
    Ok(counter.count(&frame))
}

/// Frames decoded from an ordered list of image files.
///
/// Files that fail to decode are logged and skipped; the sequence continues
/// with the next path.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
    canonical: bool,
    decoded: Vec<PathBuf>,
    skipped: Vec<PathBuf>,
}

impl ImageSequenceSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            canonical: false,
            decoded: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Resize every frame to 600×400, as done for video input.
    pub fn canonical_size(mut self, enabled: bool) -> Self {
        self.canonical = enabled;
        self
    }

    /// Paths of the frames yielded so far, in order.
    pub fn decoded(&self) -> &[PathBuf] {
        &self.decoded
    }

    /// Paths that could not be decoded so far.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    fn decode(&self, path: &Path) -> Result<RgbFrame, ImageSourceError> {
        let frame = load_frame(path)?;
        if self.canonical {
            to_canonical(&frame)
        } else {
            Ok(frame)
        }
    }
}

impl Iterator for ImageSequenceSource {
    type Item = RgbFrame;

    fn next(&mut self) -> Option<RgbFrame> {
        while let Some(path) = self.paths.pop_front() {
            match self.decode(&path) {
                Ok(frame) => {
                    debug!("loaded {} ({}x{})", path.display(), frame.width(), frame.height());
                    self.decoded.push(path);
                    return Some(frame);
                }
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    self.skipped.push(path);
                }
            }
        }
        None
    }
}
