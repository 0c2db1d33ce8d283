//! Fixed-window energy segmentation.
//!
//! A waveform of `L` samples is cut into `S = floor(L / window_size)`
//! non-overlapping windows.  Each window yields one [`EnergySegment`]:
//!
//! | Field         | Value                                          |
//! |---------------|------------------------------------------------|
//! | `energy`      | `Σ x²` over the window                         |
//! | `center_time` | `(i + 0.5) · window_size / sample_rate` seconds |
//!
//! The trailing `L mod window_size` samples are dropped: never zero-padded and
//! never merged into the last window.
//!
//! # Example
//!
//! ```rust
//! use wave_stats::analysis::EnergySegmenter;
//! use wave_stats::audio::Waveform;
//!
//! let wf = Waveform::new(vec![1.0; 5], 1_000);
//! let segs = EnergySegmenter::new(2).unwrap().segment(&wf);
//! assert_eq!(segs.len(), 2); // fifth sample dropped
//! assert_eq!(segs[0].energy, 2.0);
//! ```

use serde::Serialize;

use crate::audio::Waveform;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// EnergySegment
// ---------------------------------------------------------------------------

/// Energy of one window and the time of its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergySegment {
    /// Seconds from the start of the waveform to the window's center.
    pub center_time: f64,
    /// Sum of squared samples in the window.
    pub energy: f64,
}

// ---------------------------------------------------------------------------
// EnergySegmenter
// ---------------------------------------------------------------------------

/// Splits waveforms into `window_size`-sample windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergySegmenter {
    window_size: usize,
}

impl EnergySegmenter {
    /// # Errors
    ///
    /// [`AnalysisError::InvalidWindow`] when `window_size == 0`.
    pub fn new(window_size: usize) -> Result<Self, AnalysisError> {
        if window_size == 0 {
            return Err(AnalysisError::InvalidWindow(window_size));
        }
        Ok(Self { window_size })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of complete windows in `len` samples.
    pub fn segment_count(&self, len: usize) -> usize {
        len / self.window_size
    }

    /// Lazily yield segments in increasing time order.
    pub fn segments<'w>(&self, waveform: &'w Waveform) -> impl Iterator<Item = EnergySegment> + 'w {
        let window = self.window_size;
        let rate = waveform.sample_rate.max(1) as f64;
        waveform
            .samples
            .chunks_exact(window)
            .enumerate()
            .map(move |(i, chunk)| EnergySegment {
                center_time: (i as f64 + 0.5) * window as f64 / rate,
                energy: chunk.iter().map(|&s| (s as f64) * (s as f64)).sum(),
            })
    }

    /// Eagerly collect [`segments`](Self::segments).
    pub fn segment(&self, waveform: &Waveform) -> Vec<EnergySegment> {
        let mut out = Vec::with_capacity(self.segment_count(waveform.len()));
        out.extend(self.segments(waveform));
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
