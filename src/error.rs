//! Error taxonomy shared by every analysis stage.
//!
//! All stages fail fast: the first [`AnalysisError`] aborts the run and is
//! propagated to the caller unchanged.  No stage catches, retries or skips.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Everything that can abort a scan, accumulation, segmentation or render.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No waveform files matched the discovery filter (or an empty file list
    /// was handed to a corpus-wide stage).
    #[error("no waveform files found in '{}'", root.display())]
    EmptyCollection { root: PathBuf },

    /// A file could not be read as valid waveform data.
    #[error("failed to decode '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// Global min equals global max, uniform binning is undefined.
    #[error("degenerate amplitude range: min == max == {value}")]
    DegenerateRange { value: f64 },

    /// Destination already exists and overwrite was not requested.
    #[error("output '{}' already exists (pass --overwrite to replace it)", path.display())]
    OutputExists { path: PathBuf },

    /// Statistics were requested over a zero-length sample sequence.
    #[error("waveform has no samples{}", path.as_ref().map(|p| format!(": '{}'", p.display())).unwrap_or_default())]
    EmptyWaveform { path: Option<PathBuf> },

    /// Bin count must be at least 1.
    #[error("interval count must be >= 1 (got {0})")]
    InvalidIntervals(usize),

    /// Energy window must be at least one sample.
    #[error("window size must be >= 1 sample (got {0})")]
    InvalidWindow(usize),

    /// Range bounds were NaN, infinite, or inverted (min > max).
    #[error("invalid amplitude range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    /// Filesystem failure outside of decoding (walking, creating dirs, writing).
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The plotting backend failed to draw or encode an image.
    #[error("failed to render '{}': {reason}", path.display())]
    Render { path: PathBuf, reason: String },

    /// A concurrent worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl AnalysisError {
    /// Wrap an [`std::io::Error`] with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`AnalysisError::Decode`] from any displayable cause.
    pub fn decode(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
