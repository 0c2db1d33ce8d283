//! Configuration module.
//!
//! Provides `AnalysisConfig` (top-level settings), one sub-config per
//! concern, `AppPaths` for the platform settings location, and TOML
//! persistence via `AnalysisConfig::load_from` / `AnalysisConfig::save_to`.
//!
//! Components never read configuration themselves: callers pass the relevant
//! section (or plain values taken from it) in explicitly.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AnalysisConfig, DiscoveryConfig, EnergyConfig, HistogramConfig, OutputConfig, RuntimeConfig,
};
