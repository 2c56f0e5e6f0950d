//! Density clustering of horizontal-line positions.
//!
//! Lines detected on the same physical sheet edge land a pixel or two apart,
//! so their midpoint-y values are grouped with a 1-D DBSCAN: a value is a
//! *core* point when at least `min_points` values (itself included) lie within
//! `eps`, clusters grow by chaining core points, and values reachable from no
//! core point are noise.
//!
//! In one dimension DBSCAN reduces to a sweep over sorted values, so no
//! spatial index is needed.

use crate::{HorizontalLine, ParamsError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Parameters for the midpoint clustering.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Neighbourhood radius in pixels (inclusive).
    pub eps: f32,
    /// Minimum neighbourhood size, the point itself included.
    pub min_points: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: 2.0,
            min_points: 2,
        }
    }
}

impl ClusterParams {
    /// Reject a negative or non-finite `eps`.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.eps.is_finite() && self.eps >= 0.0) {
            return Err(ParamsError::new("eps", self.eps, "a finite radius >= 0"));
        }
        Ok(())
    }
}

/// Label attached to one clustered value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterLabel {
    Cluster(usize),
    Noise,
}

impl ClusterLabel {
    pub fn cluster(self) -> Option<usize> {
        match self {
            ClusterLabel::Cluster(c) => Some(c),
            ClusterLabel::Noise => None,
        }
    }
}

/// Result of clustering: one label per input value, in input order.
///
/// Cluster indices are dense (`0..num_clusters`). They follow ascending
/// midpoint order but callers should only rely on the count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub labels: Vec<ClusterLabel>,
    pub num_clusters: usize,
}

impl ClusterAssignment {
    /// Number of sheet boundaries, i.e. distinct non-noise labels.
    #[inline]
    pub fn sheet_count(&self) -> usize {
        self.num_clusters
    }

    pub fn noise_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| matches!(l, ClusterLabel::Noise))
            .count()
    }

    /// Input indices that belong to `cluster`.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.cluster() == Some(cluster))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Cluster horizontal lines by their midpoint-y.
pub fn cluster_lines(lines: &[HorizontalLine], params: &ClusterParams) -> ClusterAssignment {
    let midpoints: Vec<i32> = lines.iter().map(HorizontalLine::midpoint_y).collect();
    cluster_midpoints(&midpoints, params)
}

/// 1-D DBSCAN over integer positions.
///
/// Border points within `eps` of two clusters go to the nearer core point,
/// ties to the lower cluster. Empty input yields an empty assignment, and so
/// does a set of params rejected by [`ClusterParams::validate`].
pub fn cluster_midpoints(values: &[i32], params: &ClusterParams) -> ClusterAssignment {
    let n = values.len();
    if n == 0 {
        return ClusterAssignment::default();
    }
    if let Err(err) = params.validate() {
        warn!("clustering skipped: {err}");
        return ClusterAssignment {
            labels: vec![ClusterLabel::Noise; n],
            num_clusters: 0,
        };
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| (values[i], i));
    let sorted: Vec<i32> = order.iter().map(|&i| values[i]).collect();

    let within = |a: i32, b: i32| ((a - b).abs() as f32) <= params.eps;

    // 1. Neighbourhood sizes with a sliding window over the sorted values.
    let mut is_core = vec![false; n];
    let mut lo = 0usize;
    let mut hi = 0usize;
    for (k, &v) in sorted.iter().enumerate() {
        while lo < k && !within(sorted[lo], v) {
            lo += 1;
        }
        if hi < k {
            hi = k;
        }
        while hi + 1 < n && within(sorted[hi + 1], v) {
            hi += 1;
        }
        is_core[k] = hi - lo + 1 >= params.min_points;
    }

    // 2. Chain core points: consecutive cores within eps share a cluster.
    let mut sorted_labels = vec![ClusterLabel::Noise; n];
    let mut num_clusters = 0usize;
    let mut last_core: Option<usize> = None;
    for k in 0..n {
        if !is_core[k] {
            continue;
        }
        let joins_previous = last_core.is_some_and(|p| within(sorted[p], sorted[k]));
        if !joins_previous {
            num_clusters += 1;
        }
        sorted_labels[k] = ClusterLabel::Cluster(num_clusters - 1);
        last_core = Some(k);
    }

    // 3. Attach border points to the nearest reachable core.
    let prev_core = nearest_core_indices(&is_core, (0..n).collect());
    let next_core = {
        let mut v = nearest_core_indices(&is_core, (0..n).rev().collect());
        v.reverse();
        v
    };
    for k in 0..n {
        if is_core[k] {
            continue;
        }
        let candidates = [prev_core[k], next_core[k]];
        let best = candidates
            .iter()
            .flatten()
            .filter(|&&c| within(sorted[c], sorted[k]))
            .min_by_key(|&&c| ((sorted[c] - sorted[k]).abs(), sorted[c]));
        if let Some(&c) = best {
            sorted_labels[k] = sorted_labels[c];
        }
    }

    let mut labels = vec![ClusterLabel::Noise; n];
    for (k, &i) in order.iter().enumerate() {
        labels[i] = sorted_labels[k];
    }

    let assignment = ClusterAssignment {
        labels,
        num_clusters,
    };
    debug!(
        "clustered {n} midpoints into {num_clusters} clusters ({} noise)",
        assignment.noise_count()
    );
    assignment
}

/// For each position along `walk`, the most recent core position seen so far.
fn nearest_core_indices(is_core: &[bool], walk: Vec<usize>) -> Vec<Option<usize>> {
    let mut out = Vec::with_capacity(walk.len());
    let mut last = None;
    for k in walk {
        if is_core[k] {
            last = Some(k);
        }
        out.push(last);
    }
    out
}
