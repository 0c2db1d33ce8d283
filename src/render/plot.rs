//! `plotters` bitmap renderer.
//!
//! Text is rasterised with `ab_glyph` from a DejaVu Sans face compiled into
//! the binary and registered as the `sans-serif` family, so rendering needs
//! no system font libraries.

use std::error::Error;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::register_font;

use crate::config::OutputConfig;
use crate::error::AnalysisError;
use crate::render::{EnergyPlot, HistogramPlot, Renderer};

const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);

type DrawResult = Result<(), Box<dyn Error>>;

static SANS_SERIF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

/// Register the bundled face once per process.  Every chart caption, axis
/// description and tick label resolves `sans-serif` through it.
fn ensure_font(out: &Path) -> Result<(), AnalysisError> {
    let ok = *FONT_REGISTERED
        .get_or_init(|| register_font("sans-serif", FontStyle::Normal, SANS_SERIF).is_ok());
    if ok {
        Ok(())
    } else {
        Err(AnalysisError::Render {
            path: out.to_path_buf(),
            reason: "bundled sans-serif font could not be loaded".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// PlotRenderer
// ---------------------------------------------------------------------------

/// Draws PNG (or any `image`-supported extension) files.
#[derive(Debug, Clone)]
pub struct PlotRenderer {
    width: u32,
    height: u32,
    max_points: usize,
}

impl PlotRenderer {
    pub fn new(width: u32, height: u32, max_points: usize) -> Self {
        Self {
            width,
            height,
            max_points: max_points.max(2),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.width, config.height, config.max_plot_points)
    }

    fn draw_histogram(&self, plot: &HistogramPlot<'_>, out: &Path) -> DrawResult {
        let root = BitMapBackend::new(out, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let peak = plot.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
        let mut chart = ChartBuilder::on(&root)
            .caption(plot.title, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(plot.edges.min()..plot.edges.max(), 0f64..peak * 1.05)?;

        chart
            .configure_mesh()
            .x_desc("Amplitude")
            .y_desc("Count")
            .draw()?;

        let fill = BAR_COLOR.mix(0.7).filled();
        chart.draw_series(
            plot.edges
                .edges()
                .windows(2)
                .zip(plot.counts)
                .map(|(w, &c)| Rectangle::new([(w[0], 0.0), (w[1], c as f64)], fill)),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_wave_and_energy(&self, plot: &EnergyPlot<'_>, out: &Path) -> DrawResult {
        let root = BitMapBackend::new(out, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(plot.title, ("sans-serif", 20))?;
        let panels = root.split_evenly((2, 1));

        let duration = plot.waveform.duration_secs();
        let x_range = 0f64..if duration > 0.0 { duration } else { 1.0 };

        // Waveform panel
        let trace = self.decimate(plot.waveform.samples.as_slice(), plot.waveform.sample_rate);
        let (lo, hi) = trace
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
        let mut wave = ChartBuilder::on(&panels[0])
            .caption("Waveform", ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), padded(lo, hi))?;
        wave.configure_mesh()
            .x_desc("Time(s)")
            .y_desc("Amplitude")
            .draw()?;
        wave.draw_series(LineSeries::new(trace, &BLUE))?;

        // Energy panel
        let peak = plot.segments.iter().map(|s| s.energy).fold(0.0_f64, f64::max);
        let mut energy = ChartBuilder::on(&panels[1])
            .caption("Energy per segment", ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0f64..if peak > 0.0 { peak * 1.05 } else { 1.0 })?;
        energy
            .configure_mesh()
            .x_desc("Time(s)")
            .y_desc("Energy")
            .draw()?;
        energy.draw_series(LineSeries::new(
            plot.segments.iter().map(|s| (s.center_time, s.energy)),
            &RED,
        ))?;

        root.present()?;
        Ok(())
    }

    /// At most `max_points` (time, amplitude) pairs.  Long waveforms are
    /// reduced to a min/max envelope per chunk so peaks stay visible.
    fn decimate(&self, samples: &[f32], sample_rate: u32) -> Vec<(f64, f64)> {
        let rate = sample_rate.max(1) as f64;
        if samples.len() <= self.max_points {
            return samples
                .iter()
                .enumerate()
                .map(|(i, &s)| (i as f64 / rate, s as f64))
                .collect();
        }

        let chunk = samples.len().div_ceil(self.max_points / 2);
        let mut points = Vec::with_capacity(self.max_points);
        for (k, block) in samples.chunks(chunk).enumerate() {
            let t = (k * chunk) as f64 / rate;
            let (lo, hi) = block
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
            points.push((t, lo as f64));
            points.push((t, hi as f64));
        }
        points
    }
}

/// Axis range around `[lo, hi]` with 5% headroom; falls back to `[-1, 1]`
/// when there is no data and to `value ± 1` for a flat trace.
fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return -1.0..1.0;
    }
    if lo == hi {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

fn render_error(out: &Path, err: Box<dyn Error>) -> AnalysisError {
    AnalysisError::Render {
        path: out.to_path_buf(),
        reason: err.to_string(),
    }
}

impl Renderer for PlotRenderer {
    fn histogram(&self, plot: &HistogramPlot<'_>, out: &Path) -> Result<(), AnalysisError> {
        ensure_font(out)?;
        self.draw_histogram(plot, out)
            .map_err(|e| render_error(out, e))
    }

    fn wave_and_energy(&self, plot: &EnergyPlot<'_>, out: &Path) -> Result<(), AnalysisError> {
        ensure_font(out)?;
        self.draw_wave_and_energy(plot, out)
            .map_err(|e| render_error(out, e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
