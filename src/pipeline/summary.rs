//! Which job ran and what it left on disk.

use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// The four batch jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    /// One histogram over every sample of the corpus.
    GlobalHistogram,
    /// One histogram image per file.
    FileHistograms,
    /// Summary line plus histogram image per file.
    FileStats,
    /// Waveform + energy figure per file.
    EnergyPlots,
}

impl Job {
    /// Name used in log lines and in `manifest.json`.
    ///
    /// ```
    /// use wave_stats::pipeline::Job;
    ///
    /// assert_eq!(Job::GlobalHistogram.label(), "global");
    /// assert_eq!(Job::FileHistograms.label(), "histograms");
    /// assert_eq!(Job::FileStats.label(), "stats");
    /// assert_eq!(Job::EnergyPlots.label(), "energy");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Job::GlobalHistogram => "global",
            Job::FileHistograms => "histograms",
            Job::FileStats => "stats",
            Job::EnergyPlots => "energy",
        }
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Returned by every per-file job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub job: Job,
    /// Files loaded and processed.
    pub files: usize,
    /// Images written, in corpus order.
    pub artifacts: Vec<PathBuf>,
    /// `manifest.json` path, written after the last artifact.
    pub manifest: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_serializes_snake_case() {
        let json = serde_json::to_string(&Job::EnergyPlots).unwrap();
        assert_eq!(json, "\"energy_plots\"");
        assert_eq!(Job::FileStats.to_string(), "stats");
    }
}
