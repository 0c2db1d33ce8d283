//! Per-file scalar summary: duration and amplitude extremes.

use serde::Serialize;

use crate::audio::Waveform;
use crate::error::AnalysisError;

/// Duration plus min / max / mean(|x|) of one mono waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FileStats {
    pub duration_secs: f64,
    pub min: f64,
    pub max: f64,
    pub mean_abs: f64,
    pub samples: usize,
}

impl FileStats {
    /// Single O(n) pass over `waveform`.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::EmptyWaveform`] for a zero-length waveform, where
    /// min / max / mean are undefined.
    pub fn summarize(waveform: &Waveform) -> Result<Self, AnalysisError> {
        if waveform.is_empty() {
            return Err(AnalysisError::EmptyWaveform { path: None });
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut abs_sum = 0.0_f64;
        for &s in &waveform.samples {
            let s = s as f64;
            min = min.min(s);
            max = max.max(s);
            abs_sum += s.abs();
        }

        Ok(Self {
            duration_secs: waveform.duration_secs(),
            min,
            max,
            mean_abs: abs_sum / waveform.len() as f64,
            samples: waveform.len(),
        })
    }

    /// `<name> | dur: 1.23s | amp(min,max,mean)=(-0.500,0.750,0.125)`
    pub fn summary_line(&self, name: &str) -> String {
        format!(
            "{name} | dur: {:.2}s | amp(min,max,mean)=({:.3},{:.3},{:.3})",
            self.duration_secs, self.min, self.max, self.mean_abs
        )
    }
}
