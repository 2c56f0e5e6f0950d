//! Lightweight pixel containers shared by every pipeline stage.
//!
//! Frames are row-major interleaved RGB (3 × u8 per pixel). Gray images and
//! edge maps keep one value per pixel and always match the dimensions of the
//! frame they were derived from.

use crate::FrameError;
use serde::{Deserialize, Serialize};

/// Number of interleaved channels in a frame.
pub const FRAME_CHANNELS: usize = 3;

/// Borrowed frame with a validated layout.
#[derive(Clone, Copy, Debug)]
pub struct RgbFrameView<'a> {
    width: usize,
    height: usize,
    data: &'a [u8], // row-major, len = w*h*3
}

impl<'a> RgbFrameView<'a> {
    /// Validate and borrow an interleaved RGB buffer.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, FrameError> {
        validate_layout(width, height, FRAME_CHANNELS, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Owned frame of the same size with `f` applied to every channel value.
    pub fn map_channels(&self, f: impl Fn(u8) -> u8) -> RgbFrame {
        RgbFrame {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// Owned RGB frame.
///
/// Every constructor validates the layout: zero dimensions, a wrong channel
/// count and mismatched buffer lengths are rejected instead of coerced, so a
/// frame that exists is always safe to hand to the pipeline. Deserialization
/// goes through the same check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct RgbFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

#[derive(Deserialize)]
struct RawFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl TryFrom<RawFrame> for RgbFrame {
    type Error = FrameError;

    fn try_from(raw: RawFrame) -> Result<Self, FrameError> {
        Self::from_raw(raw.width, raw.height, raw.data)
    }
}

impl RgbFrame {
    /// Validate and wrap an interleaved RGB buffer.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        validate_layout(width, height, FRAME_CHANNELS, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Validate a buffer with an explicit channel count.
    ///
    /// Only 3-channel input is accepted; anything else is a malformed frame.
    pub fn from_raw_channels(
        width: usize,
        height: usize,
        channels: usize,
        data: &[u8],
    ) -> Result<Self, FrameError> {
        validate_layout(width, height, channels, data.len())?;
        Ok(Self {
            width,
            height,
            data: data.to_vec(),
        })
    }

    /// Frame of the given size with every pixel set to `rgb`.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Result<Self, FrameError> {
        let len = checked_len(width, height, FRAME_CHANNELS)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self::from_raw(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn view(&self) -> RgbFrameView<'_> {
        RgbFrameView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * FRAME_CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * FRAME_CHANNELS;
        self.data[i..i + FRAME_CHANNELS].copy_from_slice(&rgb);
    }

    /// Fill the half-open rectangle `[x0, x1) × [y0, y1)`, clipped to the frame.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, rgb: [u8; 3]) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.put_pixel(x, y, rgb);
            }
        }
    }
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::ZeroDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(FrameError::TooLarge { width, height })
}

fn validate_layout(
    width: usize,
    height: usize,
    channels: usize,
    len: usize,
) -> Result<(), FrameError> {
    if channels != FRAME_CHANNELS {
        return Err(FrameError::ChannelCount {
            expected: FRAME_CHANNELS,
            got: channels,
        });
    }
    let expected = checked_len(width, height, channels)?;
    if len != expected {
        return Err(FrameError::BufferLength { expected, got: len });
    }
    Ok(())
}

/// Single-channel intensity image derived from a frame.
#[derive(Clone, Debug)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImage {
    /// Integer BT.601 luma: `(299 R + 587 G + 114 B) / 1000`, rounded.
    pub fn from_rgb(src: &RgbFrameView<'_>) -> Self {
        let data = src
            .data
            .chunks_exact(FRAME_CHANNELS)
            .map(|px| {
                let y = 299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32;
                ((y + 500) / 1000) as u8
            })
            .collect();
        Self {
            width: src.width,
            height: src.height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/// Binary edge map with the same dimensions as its source frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMap {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl EdgeMap {
    /// Map with no edge pixels.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set_edge(&mut self, x: usize, y: usize) {
        self.data[y * self.width + x] = true;
    }

    pub fn edge_count(&self) -> usize {
        self.data.iter().filter(|&&e| e).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&e| e)
    }

    /// Edge pixel coordinates in raster order.
    pub fn edge_points(&self) -> Vec<(usize, usize)> {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &e)| e)
            .map(|(i, _)| (i % w, i / w))
            .collect()
    }
}
