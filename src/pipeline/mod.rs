//! Batch jobs over a waveform corpus.
//!
//! # Architecture
//!
//! ```text
//! Corpus::discover(input_dir)
//!        │
//!        ▼
//! Pipeline { Arc<dyn WaveformSource>, Arc<dyn Renderer>, AnalysisConfig }
//!        │
//!        ├─ global_histogram  → outpath (.png + .json)
//!        ├─ file_histograms   → outdir/<rel>/<stem>_hist.png + manifest.json
//!        ├─ file_stats        → StatsReporter + outdir/<rel>/<stem>_hist.png
//!        └─ energy_plots      → outdir/<rel>/<stem>.png + manifest.json
//! ```
//!
//! Every job fails fast: the first [`AnalysisError`](crate::AnalysisError)
//! is returned and nothing after it runs.

pub mod runner;
pub mod summary;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::Pipeline;
pub use summary::{Job, RunSummary};
