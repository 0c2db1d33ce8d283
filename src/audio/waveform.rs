//! Mono waveform container handed from a [`WaveformSource`] to the analysis
//! stages.
//!
//! # Example
//!
//! ```rust
//! use wave_stats::audio::Waveform;
//!
//! // L/R interleaved stereo, averaged to mono on construction
//! let wf = Waveform::from_interleaved(&[0.5, -0.5, 1.0, 0.0], 2, 8_000);
//! assert_eq!(wf.samples, vec![0.0, 0.5]);
//! assert_eq!(wf.sample_rate, 8_000);
//! ```
//!
//! [`WaveformSource`]: crate::audio::WaveformSource

use crate::analysis::AmplitudeRange;
use crate::audio::mixdown::downmix;

// ---------------------------------------------------------------------------
// Waveform
// ---------------------------------------------------------------------------

/// A single-channel sample sequence plus its sample rate.
///
/// Every analysis stage assumes mono input; multi-channel sources are reduced
/// with [`Waveform::from_interleaved`] during ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Mono samples, nominally in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Samples per second (always > 0 for decoded files).
    pub sample_rate: u32,
}

impl Waveform {
    /// Wrap already-mono samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Average `channels` interleaved channels down to mono.
    pub fn from_interleaved(interleaved: &[f32], channels: u16, sample_rate: u32) -> Self {
        Self::new(downmix(interleaved, channels), sample_rate)
    }

    /// Number of mono samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds (`len / sample_rate`).  Zero when the rate is zero.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Local min/max of the samples, or `None` for an empty waveform.
    pub fn range(&self) -> Option<AmplitudeRange> {
        AmplitudeRange::of_samples(&self.samples)
    }

    /// Timestamp in seconds of every sample (`i / sample_rate`).
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        let rate = self.sample_rate.max(1) as f64;
        (0..self.samples.len()).map(move |i| i as f64 / rate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_len_over_rate() {
        let wf = Waveform::new(vec![0.0; 22_050], 44_100);
        assert!((wf.duration_secs() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_rate_has_zero_duration() {
        let wf = Waveform::new(vec![0.1; 10], 0);
        assert_eq!(wf.duration_secs(), 0.0);
    }

    #[test]
    fn range_of_empty_is_none() {
        assert!(Waveform::new(Vec::new(), 16_000).range().is_none());
    }

    #[test]
    fn range_tracks_extremes() {
        let wf = Waveform::new(vec![0.2, -0.7, 0.9, 0.0], 16_000);
        let r = wf.range().unwrap();
        assert!((r.min - (-0.7_f32) as f64).abs() < 1e-9);
        assert!((r.max - 0.9_f32 as f64).abs() < 1e-9);
    }

    #[test]
    fn times_step_by_sample_period() {
        let wf = Waveform::new(vec![0.0; 4], 4);
        let t: Vec<f64> = wf.times().collect();
        assert_eq!(t, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn interleaved_stereo_is_averaged() {
        let wf = Waveform::from_interleaved(&[1.0, -1.0, 0.5, 0.5], 2, 16_000);
        assert_eq!(wf.len(), 2);
        assert!((wf.samples[0] - 0.0).abs() < 1e-6);
        assert!((wf.samples[1] - 0.5).abs() < 1e-6);
    }
}
