//! Uniform bin edges shared by every file of a histogram run.

use serde::Serialize;

use crate::analysis::AmplitudeRange;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// BinEdges
// ---------------------------------------------------------------------------

/// `N + 1` strictly increasing, uniformly spaced edges defining `N` bins.
///
/// Bin `i` is the half-open interval `[edges[i], edges[i + 1])`, except the
/// last bin which is closed on the right so the maximum is counted.
///
/// ```rust
/// use wave_stats::analysis::BinEdges;
///
/// let edges = BinEdges::build(0.0, 1.0, 4).unwrap();
/// assert_eq!(edges.edges(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(edges.bin_index(1.0), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// `edges[i] = min + i * (max - min) / n_intervals`, with the last edge
    /// pinned to `max`.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InvalidIntervals`]: `n_intervals == 0`.
    /// - [`AnalysisError::InvalidRange`]: a bound is not finite, or `min > max`.
    /// - [`AnalysisError::DegenerateRange`]: `min == max`.
    pub fn build(min: f64, max: f64, n_intervals: usize) -> Result<Self, AnalysisError> {
        if n_intervals == 0 {
            return Err(AnalysisError::InvalidIntervals(n_intervals));
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(AnalysisError::InvalidRange { min, max });
        }
        if min == max {
            return Err(AnalysisError::DegenerateRange { value: min });
        }

        let step = (max - min) / n_intervals as f64;
        let mut edges: Vec<f64> = (0..=n_intervals).map(|i| min + i as f64 * step).collect();
        edges[n_intervals] = max;

        Ok(Self { edges })
    }

    /// [`build`](Self::build) over a measured range.
    pub fn from_range(range: AmplitudeRange, n_intervals: usize) -> Result<Self, AnalysisError> {
        Self::build(range.min, range.max, n_intervals)
    }

    /// Edges for a single file's own histogram.
    ///
    /// Unlike [`build`](Self::build), a zero-width range is widened to
    /// `[value - 0.5, value + 0.5]` so constant (e.g. silent) files still get
    /// a histogram with every sample in the middle bin.
    pub fn for_samples(range: AmplitudeRange, n_intervals: usize) -> Result<Self, AnalysisError> {
        if range.min == range.max && range.min.is_finite() {
            return Self::build(range.min - 0.5, range.max + 0.5, n_intervals);
        }
        Self::from_range(range, n_intervals)
    }

    /// Raw edge values (`intervals() + 1` of them).
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins `N`.
    pub fn intervals(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Width of every bin.
    pub fn width(&self) -> f64 {
        (self.max() - self.min()) / self.intervals() as f64
    }

    /// Midpoint of each bin, used as the bar position when plotting.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Bin holding `x`, or `None` when `x` is outside `[min, max]` or NaN.
    ///
    /// The index is computed arithmetically and then corrected against the
    /// stored edges, so rounding in `(x - min) / width` never puts a sample on
    /// the wrong side of an edge.
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        let (lo, hi) = (self.min(), self.max());
        if !(x >= lo && x <= hi) {
            return None;
        }

        let n = self.intervals();
        let mut i = (((x - lo) / (hi - lo)) * n as f64) as usize;
        i = i.min(n - 1);

        if x < self.edges[i] {
            i -= 1;
        } else if i + 1 < n && x >= self.edges[i + 1] {
            i += 1;
        }
        Some(i)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
