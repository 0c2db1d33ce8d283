//! Second pass of the corpus histogram and single-file histograms.
//!
//! # Two-pass algorithm
//!
//! ```text
//! Corpus ──▶ RangeScanner::scan ──▶ (min, max)
//!                                       │
//!                                       ▼
//!                           BinEdges::build(min, max, N)
//!                                       │
//! Corpus ──▶ HistogramAccumulator::accumulate(edges) ──▶ HistogramState
//! ```
//!
//! Each pass holds at most one decoded file in memory; the running state is
//! `N` counters regardless of corpus size.  Both passes must see the same
//! [`Corpus`], which is why they take the resolved file list and never a
//! directory.

use serde::Serialize;

use crate::analysis::{AmplitudeRange, BinEdges, RangeScanner};
use crate::audio::WaveformSource;
use crate::corpus::Corpus;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// HistogramState
// ---------------------------------------------------------------------------

/// Per-bin sample counts plus a tally of samples that fell outside the edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramState {
    counts: Vec<u64>,
    out_of_range: u64,
}

impl HistogramState {
    /// All-zero state with `bins` counters.
    pub fn new(bins: usize) -> Self {
        Self {
            counts: vec![0; bins],
            out_of_range: 0,
        }
    }

    /// Bin `samples` against `edges` into a fresh state.
    pub fn from_samples(edges: &BinEdges, samples: &[f32]) -> Self {
        let mut state = Self::new(edges.intervals());
        state.add_samples(edges, samples);
        state
    }

    /// Classify every sample and add it to its bin.
    ///
    /// Samples outside `[edges.min(), edges.max()]` (and NaN) are counted in
    /// [`out_of_range`](Self::out_of_range) instead.
    pub fn add_samples(&mut self, edges: &BinEdges, samples: &[f32]) {
        debug_assert_eq!(self.counts.len(), edges.intervals());
        for &s in samples {
            match edges.bin_index(s as f64) {
                Some(i) => self.counts[i] += 1,
                None => self.out_of_range += 1,
            }
        }
    }

    /// Element-wise addition of another state built on the same edges.
    pub fn merge(&mut self, other: &HistogramState) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.out_of_range += other.out_of_range;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Sum of all bin counts (excludes out-of-range samples).
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    pub fn into_counts(self) -> Vec<u64> {
        self.counts
    }
}

// ---------------------------------------------------------------------------
// HistogramAccumulator
// ---------------------------------------------------------------------------

/// Sequential second pass: bins every file against shared edges.
pub struct HistogramAccumulator<'a> {
    source: &'a dyn WaveformSource,
}

impl<'a> HistogramAccumulator<'a> {
    pub fn new(source: &'a dyn WaveformSource) -> Self {
        Self { source }
    }

    /// Accumulate the histogram of every file in `corpus` against `edges`.
    ///
    /// `corpus` must be the same file list the edges were derived from;
    /// otherwise samples outside the scanned range end up in
    /// [`HistogramState::out_of_range`].
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::EmptyCollection`]: `corpus` has no files.
    /// - [`AnalysisError::Decode`]: the first unreadable file; nothing is
    ///   returned for the files before it.
    pub fn accumulate(
        &self,
        corpus: &Corpus,
        edges: &BinEdges,
    ) -> Result<HistogramState, AnalysisError> {
        if corpus.is_empty() {
            return Err(AnalysisError::EmptyCollection {
                root: corpus.root().to_path_buf(),
            });
        }

        let mut total = HistogramState::new(edges.intervals());
        for path in corpus.files() {
            let waveform = self.source.load(path)?;
            total.add_samples(edges, &waveform.samples);
            log::debug!("histogram: {} ({} samples)", path.display(), waveform.len());
        }

        warn_out_of_range(&total);
        Ok(total)
    }
}

pub(crate) fn warn_out_of_range(state: &HistogramState) {
    if state.out_of_range() > 0 {
        log::warn!(
            "histogram: {} samples fell outside the bin edges (file lists differ between passes?)",
            state.out_of_range()
        );
    }
}

// ---------------------------------------------------------------------------
// GlobalHistogram
// ---------------------------------------------------------------------------

/// Result of a full corpus run: shared edges plus accumulated counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalHistogram {
    pub range: AmplitudeRange,
    pub edges: BinEdges,
    pub counts: Vec<u64>,
    pub out_of_range: u64,
    pub files: usize,
}

impl GlobalHistogram {
    /// Run both passes sequentially over `corpus`.
    pub fn compute(
        source: &dyn WaveformSource,
        corpus: &Corpus,
        n_intervals: usize,
    ) -> Result<Self, AnalysisError> {
        if n_intervals == 0 {
            return Err(AnalysisError::InvalidIntervals(n_intervals));
        }
        let range = RangeScanner::new(source).scan(corpus)?;
        let edges = BinEdges::from_range(range, n_intervals)?;
        let state = HistogramAccumulator::new(source).accumulate(corpus, &edges)?;
        Ok(Self::assemble(range, edges, state, corpus))
    }

    pub(crate) fn assemble(
        range: AmplitudeRange,
        edges: BinEdges,
        state: HistogramState,
        corpus: &Corpus,
    ) -> Self {
        let out_of_range = state.out_of_range();
        Self {
            range,
            edges,
            counts: state.into_counts(),
            out_of_range,
            files: corpus.len(),
        }
    }

    /// Number of binned samples.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
