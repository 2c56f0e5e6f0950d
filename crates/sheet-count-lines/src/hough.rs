//! Progressive probabilistic Hough transform.
//!
//! Edge points are visited in a seeded random order. Each visited point
//! votes in a (θ, ρ) accumulator; as soon as one bin reaches the vote
//! threshold the corresponding line is walked through the edge map in both
//! directions, bridging gaps of up to `max_line_gap` pixels. Long enough
//! walks become segments and the points on them that already voted withdraw
//! their votes. Every point on a walk is consumed, whether or not the walk
//! produced a segment.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sheet_count_core::{EdgeMap, LineSegment, ParamsError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fixed-point shift used while walking along a candidate line.
const WALK_SHIFT: u32 = 16;

/// Parameters for the probabilistic Hough line extractor.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HoughParams {
    /// Distance resolution of the accumulator, in pixels.
    pub rho: f32,
    /// Angular resolution of the accumulator, in degrees.
    pub theta_deg: f32,
    /// Votes a bin needs before its line is walked.
    pub threshold: u32,
    /// Minimum extent (along x or y) of an accepted segment, in pixels.
    pub min_line_length: u32,
    /// Largest run of missing edge pixels bridged inside one segment.
    pub max_line_gap: u32,
    /// Stop after this many segments.
    pub max_lines: Option<usize>,
    /// Seed of the point visiting order.
    pub seed: u64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta_deg: 1.0,
            threshold: 100,
            min_line_length: 100,
            max_line_gap: 10,
            max_lines: None,
            seed: 0x5eed_cafe,
        }
    }
}

impl HoughParams {
    /// Check the accumulator resolutions.
    ///
    /// `rho` must be at least 0.1 px and `theta_deg` within `[0.1, 180]`;
    /// finer grids only grow the accumulator without changing the result.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.rho.is_finite() && self.rho >= 0.1) {
            return Err(ParamsError::new("rho", self.rho, "a finite step >= 0.1 px"));
        }
        if !(self.theta_deg.is_finite() && (0.1..=180.0).contains(&self.theta_deg)) {
            return Err(ParamsError::new(
                "theta_deg",
                self.theta_deg,
                "a step within [0.1, 180] degrees",
            ));
        }
        Ok(())
    }
}

struct Accumulator {
    votes: Vec<u32>,
    num_rho: usize,
    max_r: isize,
    trig: Vec<(f32, f32)>, // (cos θ / ρ, sin θ / ρ)
}

impl Accumulator {
    fn new(width: usize, height: usize, params: &HoughParams) -> Self {
        let theta = params.theta_deg.to_radians();
        let num_angle = ((std::f32::consts::PI / theta).round() as usize).max(1);
        // |x cos θ + y sin θ| <= w + h, so ρ bins span [-max_r, max_r].
        let max_r = (((width + height) as f32 / params.rho).ceil() as isize).max(1);
        let num_rho = (2 * max_r + 1) as usize;
        let irho = 1.0 / params.rho;
        let trig = (0..num_angle)
            .map(|n| {
                let a = n as f32 * theta;
                (a.cos() * irho, a.sin() * irho)
            })
            .collect();
        Self {
            votes: vec![0; num_angle * num_rho],
            num_rho,
            max_r,
            trig,
        }
    }

    #[inline]
    fn bin(&self, n: usize, x: usize, y: usize) -> usize {
        let (c, s) = self.trig[n];
        let r = (x as f32 * c + y as f32 * s).round() as isize;
        let r = r.clamp(-self.max_r, self.max_r) + self.max_r;
        n * self.num_rho + r as usize
    }

    /// Vote for every angle; returns the strongest `(angle index, votes)`.
    fn vote(&mut self, x: usize, y: usize) -> (usize, u32) {
        let mut best = (0usize, 0u32);
        for n in 0..self.trig.len() {
            let b = self.bin(n, x, y);
            self.votes[b] += 1;
            if self.votes[b] > best.1 {
                best = (n, self.votes[b]);
            }
        }
        best
    }

    fn unvote(&mut self, x: usize, y: usize) {
        for n in 0..self.trig.len() {
            let b = self.bin(n, x, y);
            self.votes[b] = self.votes[b].saturating_sub(1);
        }
    }
}

/// Fixed-point walker along a line given by its accumulator angle.
#[derive(Clone, Copy)]
struct Walk {
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl Walk {
    fn new(x: usize, y: usize, cos_t: f32, sin_t: f32) -> Self {
        // direction perpendicular to the (cos, sin) normal
        let a = -sin_t;
        let b = cos_t;
        let (x, y) = (x as i64, y as i64);
        let one = 1i64 << WALK_SHIFT;
        let half = 1i64 << (WALK_SHIFT - 1);
        if a.abs() > b.abs() {
            Self {
                x0: x,
                y0: (y << WALK_SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one as f32 / a.abs()).round() as i64,
                x_major: true,
            }
        } else {
            Self {
                x0: (x << WALK_SHIFT) + half,
                y0: y,
                dx: (a * one as f32 / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    /// Pixel positions from the seed outward; `forward == false` walks the other way.
    fn steps(self, forward: bool) -> impl Iterator<Item = (i64, i64)> {
        let (dx, dy) = if forward {
            (self.dx, self.dy)
        } else {
            (-self.dx, -self.dy)
        };
        (0i64..).map(move |k| {
            let x = self.x0 + k * dx;
            let y = self.y0 + k * dy;
            if self.x_major {
                (x, y >> WALK_SHIFT)
            } else {
                (x >> WALK_SHIFT, y)
            }
        })
    }
}

/// Extract straight segments from an edge map.
///
/// Returns an empty vector when no line collects enough votes or when
/// `params` fail [`HoughParams::validate`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(edges, params), fields(width = edges.width(), height = edges.height()))
)]
pub fn extract_segments(edges: &EdgeMap, params: &HoughParams) -> Vec<LineSegment> {
    let (w, h) = (edges.width(), edges.height());
    let mut segments = Vec::new();
    if w == 0 || h == 0 {
        return segments;
    }
    if let Err(err) = params.validate() {
        warn!("line extraction skipped: {err}");
        return segments;
    }

    let mut points = edges.edge_points();
    let mut mask = vec![false; w * h];
    let mut voted = vec![false; w * h];
    for &(x, y) in &points {
        mask[y * w + x] = true;
    }

    let mut acc = Accumulator::new(w, h, params);
    let mut rng = StdRng::seed_from_u64(params.seed);
    let in_bounds = |x: i64, y: i64| x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h;
    let min_len = params.min_line_length as i64;

    let mut remaining = points.len();
    while remaining > 0 {
        let pick = rng.gen_range(0..remaining);
        let (x, y) = points[pick];
        points[pick] = points[remaining - 1];
        remaining -= 1;

        if !mask[y * w + x] {
            continue;
        }

        voted[y * w + x] = true;
        let (best_n, best_votes) = acc.vote(x, y);
        if best_votes < params.threshold {
            continue;
        }

        let (cos_t, sin_t) = acc.trig[best_n];
        let walk = Walk::new(x, y, cos_t, sin_t);

        // Find both ends, tolerating short gaps.
        let mut ends = [(x as i64, y as i64); 2];
        for (k, end) in ends.iter_mut().enumerate() {
            let mut gap = 0u32;
            for (px, py) in walk.steps(k == 0) {
                if !in_bounds(px, py) {
                    break;
                }
                if mask[py as usize * w + px as usize] {
                    gap = 0;
                    *end = (px, py);
                } else {
                    gap += 1;
                    if gap > params.max_line_gap {
                        break;
                    }
                }
            }
        }

        let good = (ends[1].0 - ends[0].0).abs() >= min_len
            || (ends[1].1 - ends[0].1).abs() >= min_len;

        // Consume the walked points; accepted segments also return their votes.
        for (k, &end) in ends.iter().enumerate() {
            for (px, py) in walk.steps(k == 0) {
                if !in_bounds(px, py) {
                    break;
                }
                let idx = py as usize * w + px as usize;
                if mask[idx] {
                    if good && voted[idx] {
                        acc.unvote(px as usize, py as usize);
                    }
                    mask[idx] = false;
                }
                if (px, py) == end {
                    break;
                }
            }
        }

        if good {
            segments.push(LineSegment::new(
                ends[0].0 as i32,
                ends[0].1 as i32,
                ends[1].0 as i32,
                ends[1].1 as i32,
            ));
            if params.max_lines.is_some_and(|max| segments.len() >= max) {
                break;
            }
        }
    }

    debug!("hough: {} segments from {}x{} edge map", segments.len(), w, h);
    segments
}
