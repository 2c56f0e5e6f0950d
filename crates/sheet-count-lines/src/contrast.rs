//! Linear contrast normalization applied before edge detection.

use serde::{Deserialize, Serialize};
use sheet_count_core::{RgbFrame, RgbFrameView};

/// `pixel' = saturate(|pixel * alpha + beta|)`, per channel, halves rounded to even.
///
/// `alpha` is a tuned constant, not derived from the image; there is no
/// automatic white balance.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContrastParams {
    pub alpha: f32,
    pub beta: f32,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            alpha: 1.25,
            beta: 0.0,
        }
    }
}

/// Return a contrast-adjusted copy of `frame`.
pub fn adjust_contrast(frame: &RgbFrameView<'_>, params: &ContrastParams) -> RgbFrame {
    let lut = contrast_lut(params);
    frame.map_channels(|v| lut[v as usize])
}

fn contrast_lut(params: &ContrastParams) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        let scaled = (v as f32 * params.alpha + params.beta).abs().round_ties_even();
        *out = scaled.clamp(0.0, 255.0) as u8;
    }
    lut
}
