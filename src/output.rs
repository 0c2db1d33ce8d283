//! Output destinations: overwrite policy, mirrored layout, run manifest.
//!
//! Per-file artifacts are written under an output directory that mirrors the
//! input tree:
//!
//! ```text
//! input/fold1/dog.wav    ──▶  outdir/fold1/dog_hist.png
//! input/fold2/sub/x.wav  ──▶  outdir/fold2/sub/x_hist.png
//! ```
//!
//! A `manifest.json` is written last, so an output directory without one is
//! the remains of an aborted run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::corpus::Corpus;
use crate::error::AnalysisError;

/// File name of the run manifest inside an output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

// ---------------------------------------------------------------------------
// OutputLayout
// ---------------------------------------------------------------------------

/// A prepared output directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    outdir: PathBuf,
}

impl OutputLayout {
    /// Create `outdir`.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::OutputExists`]: `outdir` exists and `overwrite` is
    ///   `false`.
    /// - [`AnalysisError::Io`]: the directory cannot be created.
    pub fn prepare(outdir: &Path, overwrite: bool) -> Result<Self, AnalysisError> {
        if outdir.exists() && !overwrite {
            return Err(AnalysisError::OutputExists {
                path: outdir.to_path_buf(),
            });
        }
        fs::create_dir_all(outdir).map_err(|e| AnalysisError::io(outdir, e))?;
        Ok(Self {
            outdir: outdir.to_path_buf(),
        })
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// `<outdir>/<dir of file relative to corpus root>/<stem><suffix>.png`,
    /// creating the subdirectory.
    pub fn mirrored(
        &self,
        corpus: &Corpus,
        file: &Path,
        suffix: &str,
    ) -> Result<PathBuf, AnalysisError> {
        let rel = corpus.relative(file);
        let dir = match rel.parent() {
            Some(parent) => self.outdir.join(parent),
            None => self.outdir.clone(),
        };
        fs::create_dir_all(&dir).map_err(|e| AnalysisError::io(&dir, e))?;

        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".into());
        Ok(dir.join(format!("{stem}{suffix}.png")))
    }

    /// Serialise `manifest` to `<outdir>/manifest.json`.
    pub fn write_manifest(&self, manifest: &RunManifest) -> Result<PathBuf, AnalysisError> {
        let path = self.outdir.join(MANIFEST_FILE);
        write_json(&path, manifest)?;
        Ok(path)
    }
}

/// Check a single-file destination and create its parent directory.
///
/// # Errors
///
/// [`AnalysisError::OutputExists`] when `path` exists and `overwrite` is
/// `false`.
pub fn prepare_file(path: &Path, overwrite: bool) -> Result<(), AnalysisError> {
    if path.exists() && !overwrite {
        return Err(AnalysisError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }
    Ok(())
}

/// Pretty-print `value` as JSON to `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AnalysisError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AnalysisError::io(path, std::io::Error::from(e)))?;
    fs::write(path, json).map_err(|e| AnalysisError::io(path, e))
}

// ---------------------------------------------------------------------------
// RunManifest
// ---------------------------------------------------------------------------

/// Record of a completed per-file run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunManifest {
    /// Which job produced the directory (`histograms`, `stats`, `energy`).
    pub job: String,
    /// Input root the corpus was discovered under.
    pub input: PathBuf,
    /// Job parameters, e.g. `{"bins": 100}`.
    pub parameters: serde_json::Value,
    /// Number of waveform files processed.
    pub files: usize,
    /// Every image written, in processing order.
    pub artifacts: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
