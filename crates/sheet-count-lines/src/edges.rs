//! Canny-style edge detection.
//!
//! Luma reduction, 3×3 Sobel gradients, non-maximum suppression along the
//! quantized gradient direction and hysteresis between two fixed thresholds.
//! No smoothing is applied beforehand.

use log::debug;
use serde::{Deserialize, Serialize};
use sheet_count_core::{EdgeMap, GrayImage, RgbFrameView};

#[cfg(feature = "tracing")]
use tracing::instrument;

type Kernel3 = [[i32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

// tan(22.5°) and tan(67.5°)
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

/// Hysteresis thresholds on the gradient magnitude.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Pixels above this magnitude may extend an edge chain.
    pub low_threshold: f32,
    /// Pixels above this magnitude seed an edge chain.
    pub high_threshold: f32,
    /// Use `sqrt(gx² + gy²)` instead of `|gx| + |gy|`.
    pub l2_gradient: bool,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 25.0,
            high_threshold: 100.0,
            l2_gradient: false,
        }
    }
}

/// Sobel responses for one image.
#[derive(Clone, Debug)]
pub struct Gradients {
    pub width: usize,
    pub height: usize,
    pub gx: Vec<i32>,
    pub gy: Vec<i32>,
    pub mag: Vec<f32>,
}

/// Detect edges on a color frame.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, params), fields(width = frame.width(), height = frame.height()))
)]
pub fn detect_edges(frame: &RgbFrameView<'_>, params: &EdgeParams) -> EdgeMap {
    let gray = GrayImage::from_rgb(frame);
    detect_edges_gray(&gray, params)
}

/// Detect edges on an already reduced intensity image.
pub fn detect_edges_gray(gray: &GrayImage, params: &EdgeParams) -> EdgeMap {
    let (w, h) = (gray.width(), gray.height());
    let mut edges = EdgeMap::empty(w, h);
    if w < 3 || h < 3 {
        return edges;
    }

    let grad = sobel_gradients(gray, params.l2_gradient);
    let (low, high) = (params.low_threshold, params.high_threshold);

    // 0 = suppressed, 1 = weak candidate, 2 = strong
    let mut state = vec![0u8; w * h];
    let mut stack = Vec::new();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let m = grad.mag[idx];
            if m <= low || !is_local_maximum(&grad, x, y) {
                continue;
            }
            if m > high {
                state[idx] = 2;
                stack.push(idx);
            } else {
                state[idx] = 1;
            }
        }
    }

    // Hysteresis: grow strong seeds through 8-connected weak candidates.
    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % w, idx / w);
        edges.set_edge(x, y);
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                let n = ny * w + nx;
                if state[n] == 1 {
                    state[n] = 2;
                    stack.push(n);
                }
            }
        }
    }

    debug!("edge map {w}x{h}: {} edge pixels", edges.edge_count());
    edges
}

/// 3×3 Sobel with replicated borders.
pub fn sobel_gradients(gray: &GrayImage, l2_gradient: bool) -> Gradients {
    let (w, h) = (gray.width(), gray.height());
    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    let mut mag = vec![0f32; w * h];

    if w == 0 || h == 0 {
        return Gradients {
            width: w,
            height: h,
            gx,
            gy,
            mag,
        };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0i32;
            let mut sum_y = 0i32;
            for (ky, &yy) in y_idx.iter().enumerate() {
                for (kx, &xx) in x_idx.iter().enumerate() {
                    let sample = gray.get(xx, yy) as i32;
                    sum_x += sample * SOBEL_KERNEL_X[ky][kx];
                    sum_y += sample * SOBEL_KERNEL_Y[ky][kx];
                }
            }

            let idx = y * w + x;
            gx[idx] = sum_x;
            gy[idx] = sum_y;
            mag[idx] = if l2_gradient {
                ((sum_x * sum_x + sum_y * sum_y) as f32).sqrt()
            } else {
                (sum_x.abs() + sum_y.abs()) as f32
            };
        }
    }

    Gradients {
        width: w,
        height: h,
        gx,
        gy,
        mag,
    }
}

/// Non-maximum suppression test along the gradient direction.
///
/// Ties keep the first pixel of a plateau so a one-row step yields a
/// one-pixel-wide edge.
fn is_local_maximum(grad: &Gradients, x: usize, y: usize) -> bool {
    let w = grad.width;
    let idx = y * w + x;
    let m = grad.mag[idx];
    let ax = grad.gx[idx].abs() as f32;
    let ay = grad.gy[idx].abs() as f32;
    let at = |xx: usize, yy: usize| grad.mag[yy * w + xx];

    if ay < ax * TAN_22_5 {
        // gradient mostly along x
        m > at(x - 1, y) && m >= at(x + 1, y)
    } else if ay > ax * TAN_67_5 {
        // gradient mostly along y
        m > at(x, y - 1) && m >= at(x, y + 1)
    } else if (grad.gx[idx] < 0) == (grad.gy[idx] < 0) {
        m > at(x - 1, y - 1) && m > at(x + 1, y + 1)
    } else {
        m > at(x + 1, y - 1) && m > at(x - 1, y + 1)
    }
}
