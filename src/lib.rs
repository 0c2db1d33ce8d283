//! Amplitude statistics for collections of waveform files.
//!
//! Modules:
//!
//! - [`audio`]: decoding WAV files into mono [`audio::Waveform`]s.
//! - [`corpus`]: discovering the files to analyse.
//! - [`analysis`]: range scan, bin edges, histograms, energy, per-file stats.
//! - [`render`]: drawing results to PNG.
//! - [`output`]: output directories, overwrite policy, manifest.
//! - [`pipeline`]: the batch jobs tying the above together.
//! - [`report`]: where per-file summary lines go.
//! - [`config`]: settings file and defaults.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod corpus;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod report;

pub use error::AnalysisError;
