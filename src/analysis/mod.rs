//! Numeric core: corpus histogram passes, energy segmentation, file stats.
//!
//! This module provides:
//! * [`RangeScanner`]: first pass, exact global min/max over a [`Corpus`].
//! * [`BinEdges`]: `N + 1` uniform edges between the scanned bounds.
//! * [`HistogramAccumulator`] / [`HistogramState`]: second pass, additive
//!   per-bin counts.
//! * [`GlobalHistogram`]: both passes wired together.
//! * [`EnergySegmenter`] / [`EnergySegment`]: per-window sum of squares.
//! * [`FileStats`]: duration and amplitude summary of one file.
//! * [`concurrent`]: the two passes on tokio's blocking pool.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wave_stats::analysis::GlobalHistogram;
//! use wave_stats::audio::WavSource;
//! use wave_stats::config::DiscoveryConfig;
//! use wave_stats::corpus::Corpus;
//!
//! let corpus = Corpus::discover(Path::new("data/UrbanSound8k/fold1"), &DiscoveryConfig::default())
//!     .unwrap();
//! let hist = GlobalHistogram::compute(&WavSource::new(), &corpus, 200).unwrap();
//! println!("{} samples in {} bins", hist.total(), hist.counts.len());
//! ```
//!
//! [`Corpus`]: crate::corpus::Corpus

pub mod bins;
pub mod concurrent;
pub mod energy;
pub mod histogram;
pub mod range;
pub mod stats;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use bins::BinEdges;
pub use energy::{EnergySegment, EnergySegmenter};
pub use histogram::{GlobalHistogram, HistogramAccumulator, HistogramState};
pub use range::{AmplitudeRange, RangeScanner};
pub use stats::FileStats;
