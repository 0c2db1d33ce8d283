//! Audio ingestion: file → decoder → channel mixdown → mono [`Waveform`].
//!
//! # Pipeline
//!
//! ```text
//! path → WaveformSource::load → interleaved f32 → downmix → Waveform (mono)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wave_stats::audio::{WavSource, WaveformSource};
//!
//! let wf = WavSource::new().load(Path::new("fold1/7061-6-0-0.wav")).unwrap();
//! println!("{} samples @ {} Hz", wf.len(), wf.sample_rate);
//! ```

pub mod mixdown;
pub mod source;
pub mod waveform;

pub use mixdown::downmix;
pub use source::{WavSource, WaveformSource};
pub use waveform::Waveform;

#[cfg(test)]
pub use source::MemorySource;
