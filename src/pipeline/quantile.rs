//! Quantile segmentation: maps a measure onto 1-5 ordinal scores
//!
//! Cut points come from the empirical distribution (equal-frequency binning).
//! Heavy-tailed, duplicate-rich measures often produce repeated quantile
//! edges; those collapse into wider bins instead of failing. Measures with a
//! known fallback (Frequency) switch to a fixed edge table when the quantile
//! edges are not strictly increasing. The choice is made up front from the
//! computed edges, never by catching a binning failure.

use rayon::prelude::*;
use serde::Serialize;

use super::error::{RfmError, RfmResult};

/// Number of ordinal groups per measure
pub const NUM_BINS: usize = 5;

/// Fixed Frequency edges: [0,1], (1,2], (2,4], (4,10], (10,inf]
pub const FREQUENCY_FALLBACK_EDGES: [f64; NUM_BINS + 1] =
    [0.0, 1.0, 2.0, 4.0, 10.0, f64::INFINITY];

/// A single ordinal score in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = NUM_BINS as u8;

    pub fn new(value: u8) -> RfmResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Score(value))
        } else {
            Err(RfmError::InvariantViolation(format!(
                "ordinal score {} outside {}..={}",
                value,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction in which labels are attached to ascending bins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LabelOrder {
    /// [1,2,3,4,5]: larger is better (Frequency, Monetary)
    #[default]
    Ascending,
    /// [5,4,3,2,1]: smaller is better (Recency)
    Descending,
}

impl LabelOrder {
    pub fn labels(self) -> [Score; NUM_BINS] {
        match self {
            LabelOrder::Ascending => [Score(1), Score(2), Score(3), Score(4), Score(5)],
            LabelOrder::Descending => [Score(5), Score(4), Score(3), Score(2), Score(1)],
        }
    }
}

/// Closed interval the distribution is clipped into before computing edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ClipBounds {
    pub fn new(lower: f64, upper: f64) -> RfmResult<Self> {
        if lower.is_nan() || upper.is_nan() {
            return Err(RfmError::InvalidConfig("clip bounds must not be NaN".into()));
        }
        if lower > upper {
            return Err(RfmError::InvalidConfig(format!(
                "clip lower bound {} exceeds upper bound {}",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Build from optional ends; a missing end is unbounded.
    pub fn from_optional(lower: Option<f64>, upper: Option<f64>) -> RfmResult<Option<Self>> {
        match (lower, upper) {
            (None, None) => Ok(None),
            (lo, hi) => Self::new(
                lo.unwrap_or(f64::NEG_INFINITY),
                hi.unwrap_or(f64::INFINITY),
            )
            .map(Some),
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

/// How a measure's bin edges were obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BinningStrategy {
    /// Empirical quantiles, duplicate edges collapsed
    #[default]
    EqualFrequency,
    /// Hand-tuned edge table
    FixedEdges,
}

impl std::fmt::Display for BinningStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinningStrategy::EqualFrequency => write!(f, "equal-frequency"),
            BinningStrategy::FixedEdges => write!(f, "fixed-edges"),
        }
    }
}

/// Fitted bin edges for one measure.
///
/// `edges` always holds `NUM_BINS + 1` ascending (not necessarily distinct)
/// values. A value `v` lands in the first slot `i` with `v <= edges[i + 1]`,
/// so the first slot is lower-inclusive and ties on an internal edge go to
/// the lower bin. A run of equal edges therefore collapses into the lowest
/// slot of the run. Values above the last edge land in the last slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinEdges {
    pub strategy: BinningStrategy,
    pub edges: Vec<f64>,
    pub labels: [Score; NUM_BINS],
}

impl BinEdges {
    /// Score a single value.
    pub fn assign(&self, value: f64) -> Score {
        let slot = self.edges[1..]
            .iter()
            .position(|&upper| value <= upper)
            .unwrap_or(NUM_BINS - 1);
        self.labels[slot]
    }

    /// Score many values in parallel; output order matches input order.
    pub fn assign_all(&self, values: &[f64]) -> Vec<Score> {
        values.par_iter().map(|&v| self.assign(v)).collect()
    }

    /// Number of bins with distinct edges (1..=NUM_BINS).
    pub fn effective_bins(&self) -> usize {
        distinct_edge_count(&self.edges).saturating_sub(1).max(1)
    }
}

/// Segmentation parameters for one measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BinningPolicy {
    pub label_order: LabelOrder,
    pub clip: Option<ClipBounds>,
    /// Edge table used when quantile edges are not strictly increasing
    pub fallback_edges: Option<[f64; NUM_BINS + 1]>,
}

impl BinningPolicy {
    pub fn new(label_order: LabelOrder) -> Self {
        Self {
            label_order,
            ..Default::default()
        }
    }

    pub fn with_clip(mut self, clip: Option<ClipBounds>) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_fallback(mut self, edges: Option<[f64; NUM_BINS + 1]>) -> Self {
        self.fallback_edges = edges;
        self
    }

    /// Compute edges from the full value distribution.
    pub fn fit(&self, values: &[f64]) -> BinEdges {
        let mut sorted: Vec<f64> = match &self.clip {
            Some(clip) => values.iter().map(|&v| clip.apply(v)).collect(),
            None => values.to_vec(),
        };
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let edges = quantile_edges(&sorted);
        let labels = self.label_order.labels();

        match self.fallback_edges {
            Some(fixed) if !has_full_resolution(&edges) => BinEdges {
                strategy: BinningStrategy::FixedEdges,
                edges: fixed.to_vec(),
                labels,
            },
            _ => BinEdges {
                strategy: BinningStrategy::EqualFrequency,
                edges,
                labels,
            },
        }
    }
}

/// Score every value against edges computed from the values themselves.
pub fn score(values: &[f64], label_order: LabelOrder, clip: Option<ClipBounds>) -> Vec<Score> {
    BinningPolicy::new(label_order)
        .with_clip(clip)
        .fit(values)
        .assign_all(values)
}

/// Empirical quantile of ascending `sorted` at `q` in [0, 1], interpolating
/// linearly between order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

/// Equal-frequency edges at 0, 1/5, ..., 1.
pub fn quantile_edges(sorted: &[f64]) -> Vec<f64> {
    (0..=NUM_BINS)
        .map(|i| quantile(sorted, i as f64 / NUM_BINS as f64))
        .collect()
}

/// True when every quantile edge is distinct, i.e. all five groups exist.
pub fn has_full_resolution(edges: &[f64]) -> bool {
    distinct_edge_count(edges) == NUM_BINS + 1
}

fn distinct_edge_count(edges: &[f64]) -> usize {
    let mut count = 0;
    let mut prev: Option<f64> = None;
    for &edge in edges {
        if prev != Some(edge) {
            count += 1;
        }
        prev = Some(edge);
    }
    count
}
