//! First pass of the corpus histogram: the global amplitude range.
//!
//! [`RangeScanner::scan`] folds every file's local min/max into a single
//! [`AmplitudeRange`].  The fold is commutative and associative, so the result
//! does not depend on file order and per-file partial ranges can be merged in
//! any grouping (see [`crate::analysis::concurrent`]).

use serde::Serialize;

use crate::audio::WaveformSource;
use crate::corpus::Corpus;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// AmplitudeRange
// ---------------------------------------------------------------------------

/// Closed amplitude interval `[min, max]`.
///
/// [`AmplitudeRange::EMPTY`] (`+inf, -inf`) is the identity of
/// [`merge`](Self::merge).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmplitudeRange {
    pub min: f64,
    pub max: f64,
}

impl AmplitudeRange {
    /// Identity element: contains nothing.
    pub const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Min/max of `samples`, or `None` when there is nothing to measure.
    ///
    /// NaN samples are ignored.
    pub fn of_samples(samples: &[f32]) -> Option<Self> {
        let folded = samples.iter().fold(Self::EMPTY, |acc, &s| {
            let s = s as f64;
            Self {
                min: acc.min.min(s),
                max: acc.max.max(s),
            }
        });
        (!folded.is_empty()).then_some(folded)
    }

    /// Smallest range covering both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `true` until at least one finite sample has been folded in.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// `max - min`.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for AmplitudeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ---------------------------------------------------------------------------
// RangeScanner
// ---------------------------------------------------------------------------

/// Sequential global min/max pass over a [`Corpus`].
pub struct RangeScanner<'a> {
    source: &'a dyn WaveformSource,
}

impl<'a> RangeScanner<'a> {
    pub fn new(source: &'a dyn WaveformSource) -> Self {
        Self { source }
    }

    /// Load every file of `corpus` once and return the exact global range.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::EmptyCollection`]: `corpus` has no files.
    /// - [`AnalysisError::Decode`]: the first file that fails to load; no
    ///   partial range is returned.
    /// - [`AnalysisError::EmptyWaveform`]: every file decoded to zero
    ///   samples, so there is no range at all.
    pub fn scan(&self, corpus: &Corpus) -> Result<AmplitudeRange, AnalysisError> {
        if corpus.is_empty() {
            return Err(AnalysisError::EmptyCollection {
                root: corpus.root().to_path_buf(),
            });
        }

        let mut range = AmplitudeRange::EMPTY;
        for path in corpus.files() {
            let waveform = self.source.load(path)?;
            match waveform.range() {
                Some(local) => range = range.merge(local),
                None => log::debug!("range: {} has no samples", path.display()),
            }
        }

        finish(range, corpus)
    }
}

/// Turn the folded range into the scan result.
pub(crate) fn finish(range: AmplitudeRange, corpus: &Corpus) -> Result<AmplitudeRange, AnalysisError> {
    if range.is_empty() {
        return Err(AnalysisError::EmptyWaveform { path: None });
    }
    log::info!(
        "range: [{:.6}, {:.6}] over {} files",
        range.min,
        range.max,
        corpus.len()
    );
    Ok(range)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemorySource;

    fn corpus(files: &[&str]) -> Corpus {
        Corpus::from_files("data", files.iter().map(|f| std::path::PathBuf::from(*f)).collect())
    }

    #[test]
    fn scan_matches_concatenated_min_max() {
        let a = vec![0.1_f32, -0.25, 0.3];
        let b = vec![0.75_f32, 0.0];
        let c = vec![-0.5_f32, 0.5];
        let src = MemorySource::new()
            .with("a.wav", a.clone(), 8_000)
            .with("b.wav", b.clone(), 8_000)
            .with("c.wav", c.clone(), 8_000);

        let range = RangeScanner::new(&src)
            .scan(&corpus(&["a.wav", "b.wav", "c.wav"]))
            .expect("scan");

        let all: Vec<f32> = a.into_iter().chain(b).chain(c).collect();
        let expected = AmplitudeRange::of_samples(&all).unwrap();
        assert_eq!(range, expected);
        assert_eq!(range.min, -0.5);
        assert_eq!(range.max, 0.75);
    }

    #[test]
    fn scan_is_order_independent() {
        let src = MemorySource::new()
            .with("a.wav", vec![0.2, -0.9], 8_000)
            .with("b.wav", vec![0.95, 0.1], 8_000);

        let forward = RangeScanner::new(&src).scan(&corpus(&["a.wav", "b.wav"])).unwrap();
        let backward = RangeScanner::new(&src).scan(&corpus(&["b.wav", "a.wav"])).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn empty_corpus_rejected() {
        let src = MemorySource::new();
        let err = RangeScanner::new(&src).scan(&corpus(&[])).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyCollection { .. }), "{err}");
    }

    #[test]
    fn corrupt_file_aborts_scan() {
        let src = MemorySource::new()
            .with("a.wav", vec![0.2], 8_000)
            .with_corrupt("bad.wav")
            .with("c.wav", vec![0.4], 8_000);

        let err = RangeScanner::new(&src)
            .scan(&corpus(&["a.wav", "bad.wav", "c.wav"]))
            .unwrap_err();
        match err {
            AnalysisError::Decode { path, .. } => assert_eq!(path, std::path::PathBuf::from("bad.wav")),
            other => panic!("expected Decode, got {other:?}"),
        }
        // fail fast: c.wav is never loaded
        assert_eq!(src.loads(), 2);
    }

    #[test]
    fn empty_files_are_skipped_in_fold() {
        let src = MemorySource::new()
            .with("empty.wav", Vec::new(), 8_000)
            .with("a.wav", vec![-0.1, 0.1], 8_000);

        let range = RangeScanner::new(&src)
            .scan(&corpus(&["empty.wav", "a.wav"]))
            .unwrap();
        assert_eq!(range.min, (-0.1_f32) as f64);
    }

    #[test]
    fn all_empty_files_is_empty_waveform() {
        let src = MemorySource::new().with("empty.wav", Vec::new(), 8_000);
        let err = RangeScanner::new(&src).scan(&corpus(&["empty.wav"])).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyWaveform { .. }), "{err}");
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let r = AmplitudeRange::new(-0.3, 0.6);
        assert_eq!(r.merge(AmplitudeRange::EMPTY), r);
        assert_eq!(AmplitudeRange::EMPTY.merge(r), r);
    }

    #[test]
    fn nan_samples_ignored() {
        let r = AmplitudeRange::of_samples(&[f32::NAN, 0.5, -0.25]).unwrap();
        assert_eq!(r, AmplitudeRange::new(-0.25, 0.5));
        assert!(AmplitudeRange::of_samples(&[f32::NAN]).is_none());
    }
}
