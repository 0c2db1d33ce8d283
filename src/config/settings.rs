//! Analysis settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every section is
//! `#[serde(default)]`, so a settings file only needs the keys it changes.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// HistogramConfig
// ---------------------------------------------------------------------------

/// Bin counts for the corpus-wide and per-file histograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    /// Number of bins of the global (corpus-wide) histogram.
    pub n_intervals: usize,
    /// Number of bins of each per-file histogram.
    pub bins: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            n_intervals: 200,
            bins: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// EnergyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Samples per energy window.
    pub window_size: usize,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self { window_size: 100 }
    }
}

// ---------------------------------------------------------------------------
// DiscoveryConfig
// ---------------------------------------------------------------------------

/// Which files under the input directory make up the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extension to match, without the dot (case-insensitive).  Only
    /// `wav` is accepted by [`AnalysisConfig::validate`], since that is the
    /// only format the decoder reads.
    pub extension: String,
    /// Keep only the first `limit` files after sorting; `None` keeps all.
    pub limit: Option<usize>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "wav".into(),
            limit: None,
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Where and how artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Replace an existing output directory / file instead of failing.
    pub overwrite: bool,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Upper bound on points drawn for a waveform trace; longer waveforms
    /// are decimated.
    pub max_plot_points: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            width: 1500,
            height: 900,
            max_plot_points: 4000,
        }
    }
}

// ---------------------------------------------------------------------------
// RuntimeConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Files decoded concurrently by the corpus passes; `1` is fully
    /// sequential.
    pub jobs: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use wave_stats::config::AnalysisConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = AnalysisConfig::load().unwrap();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub histogram: HistogramConfig,
    pub energy: EnergyConfig,
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
    pub runtime: RuntimeConfig,
}

impl AnalysisConfig {
    /// Load from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AnalysisConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.histogram.n_intervals == 0 {
            bail!("histogram.n_intervals must be >= 1");
        }
        if self.histogram.bins == 0 {
            bail!("histogram.bins must be >= 1");
        }
        if self.energy.window_size == 0 {
            bail!("energy.window_size must be >= 1");
        }
        if self.runtime.jobs == 0 {
            bail!("runtime.jobs must be >= 1");
        }
        if self.output.width == 0 || self.output.height == 0 {
            bail!("output.width and output.height must be non-zero");
        }
        let extension = self.discovery.extension.trim_start_matches('.');
        if extension.is_empty() {
            bail!("discovery.extension must not be empty");
        }
        if !extension.eq_ignore_ascii_case("wav") {
            bail!("discovery.extension must be \"wav\" (got \"{extension}\"); only WAV files can be decoded");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_values() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.histogram.n_intervals, 200);
        assert_eq!(cfg.histogram.bins, 100);
        assert_eq!(cfg.energy.window_size, 100);
        assert_eq!(cfg.discovery.extension, "wav");
        assert!(cfg.discovery.limit.is_none());
        assert!(!cfg.output.overwrite);
        assert_eq!(cfg.runtime.jobs, 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AnalysisConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AnalysisConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested/modified.toml");

        let mut cfg = AnalysisConfig::default();
        cfg.histogram.n_intervals = 64;
        cfg.energy.window_size = 512;
        cfg.discovery.limit = Some(25);
        cfg.output.overwrite = true;
        cfg.runtime.jobs = 8;

        cfg.save_to(&path).expect("save");
        let loaded = AnalysisConfig::load_from(&path).expect("load");
        assert_eq!(loaded.histogram.n_intervals, 64);
        assert_eq!(loaded.energy.window_size, 512);
        assert_eq!(loaded.discovery.limit, Some(25));
        assert!(loaded.output.overwrite);
        assert_eq!(loaded.runtime.jobs, 8);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let cfg = AnalysisConfig::load_from(&dir.path().join("nonexistent.toml"))
            .expect("should not error");
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[energy]\nwindow_size = 256\n").unwrap();

        let cfg = AnalysisConfig::load_from(&path).expect("load");
        assert_eq!(cfg.energy.window_size, 256);
        assert_eq!(cfg.histogram.n_intervals, 200);
        assert_eq!(cfg.discovery.extension, "wav");
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[histogram\nbins = ").unwrap();
        assert!(AnalysisConfig::load_from(&path).is_err());
    }

    #[test]
    fn validate_rejects_zeroes() {
        let mut cfg = AnalysisConfig::default();
        cfg.energy.window_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.runtime.jobs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.histogram.n_intervals = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_only_wav_extension() {
        for ok in ["wav", "WAV", ".wav", ".Wav"] {
            let mut cfg = AnalysisConfig::default();
            cfg.discovery.extension = ok.into();
            assert!(cfg.validate().is_ok(), "{ok}");
        }

        for bad in ["flac", ".mp3", "", "."] {
            let mut cfg = AnalysisConfig::default();
            cfg.discovery.extension = bad.into();
            assert!(cfg.validate().is_err(), "{bad:?}");
        }

        let mut cfg = AnalysisConfig::default();
        cfg.discovery.extension = "flac".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("only WAV"), "{err:#}");
    }
}
