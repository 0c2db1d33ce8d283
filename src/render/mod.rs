//! Rendering seam: arrays in, image file out.
//!
//! [`Renderer`] is what the pipelines call; [`PlotRenderer`] draws PNGs with
//! `plotters`.  [`RecordingRenderer`] (available under `#[cfg(test)]`)
//! records what would have been drawn so pipeline tests need no image I/O.

pub mod plot;

use std::path::Path;

use crate::analysis::{BinEdges, EnergySegment};
use crate::audio::Waveform;
use crate::error::AnalysisError;

pub use plot::PlotRenderer;

// ---------------------------------------------------------------------------
// Plot descriptions
// ---------------------------------------------------------------------------

/// Bar chart of counts over bin edges.
#[derive(Debug, Clone, Copy)]
pub struct HistogramPlot<'a> {
    pub title: &'a str,
    pub edges: &'a BinEdges,
    pub counts: &'a [u64],
}

/// Two stacked panels: the waveform over time, then energy per segment.
#[derive(Debug, Clone, Copy)]
pub struct EnergyPlot<'a> {
    pub title: &'a str,
    pub waveform: &'a Waveform,
    pub segments: &'a [EnergySegment],
}

// ---------------------------------------------------------------------------
// Renderer trait
// ---------------------------------------------------------------------------

/// Draws analysis results to image files.
pub trait Renderer: Send + Sync {
    /// Render a histogram bar chart to `out`.
    fn histogram(&self, plot: &HistogramPlot<'_>, out: &Path) -> Result<(), AnalysisError>;

    /// Render the waveform + energy figure to `out`.
    fn wave_and_energy(&self, plot: &EnergyPlot<'_>, out: &Path) -> Result<(), AnalysisError>;
}

// ---------------------------------------------------------------------------
// RecordingRenderer (test double)
// ---------------------------------------------------------------------------

/// What a [`RecordingRenderer`] was asked to draw.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Histogram {
        out: std::path::PathBuf,
        title: String,
        counts: Vec<u64>,
    },
    WaveAndEnergy {
        out: std::path::PathBuf,
        title: String,
        samples: usize,
        segments: Vec<EnergySegment>,
    },
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: std::sync::Mutex<Vec<Rendered>>,
}

#[cfg(test)]
impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Rendered> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn histogram(&self, plot: &HistogramPlot<'_>, out: &Path) -> Result<(), AnalysisError> {
        self.calls.lock().unwrap().push(Rendered::Histogram {
            out: out.to_path_buf(),
            title: plot.title.to_string(),
            counts: plot.counts.to_vec(),
        });
        Ok(())
    }

    fn wave_and_energy(&self, plot: &EnergyPlot<'_>, out: &Path) -> Result<(), AnalysisError> {
        self.calls.lock().unwrap().push(Rendered::WaveAndEnergy {
            out: out.to_path_buf(),
            title: plot.title.to_string(),
            samples: plot.waveform.len(),
            segments: plot.segments.to_vec(),
        });
        Ok(())
    }
}
