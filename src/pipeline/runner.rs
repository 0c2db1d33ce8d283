//! Batch jobs: corpus in, images + manifest out.
//!
//! [`Pipeline`] owns the [`WaveformSource`] and [`Renderer`] behind `Arc`s so
//! the global histogram can hand the source to worker tasks when
//! `runtime.jobs > 1`.  Per-file jobs run sequentially in corpus order.
//!
//! # Job flow
//!
//! ```text
//! global      scan ─▶ BinEdges(n_intervals) ─▶ accumulate ─▶ render ─▶ <outpath>.json
//! histograms  per file: load ─▶ own edges(bins) ─▶ count ─▶ render <stem>_hist.png
//! stats       per file: load ─▶ FileStats ─▶ reporter ─▶ render <stem>_hist.png
//! energy      per file: load ─▶ segment(window_size) ─▶ render <stem>.png
//!                                                       └─▶ manifest.json (last)
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::analysis::concurrent::block_on_global_histogram;
use crate::analysis::{BinEdges, EnergySegmenter, FileStats, GlobalHistogram, HistogramState};
use crate::audio::{Waveform, WaveformSource};
use crate::config::AnalysisConfig;
use crate::corpus::Corpus;
use crate::error::AnalysisError;
use crate::output::{prepare_file, write_json, OutputLayout, RunManifest};
use crate::render::{EnergyPlot, HistogramPlot, Renderer};
use crate::report::{display_name, StatsReporter};

use super::summary::{Job, RunSummary};

const GLOBAL_TITLE: &str = "Global amplitude histogram";

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs the batch jobs with one source, one renderer and a validated config.
///
/// ```rust,no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use wave_stats::audio::WavSource;
/// use wave_stats::config::AnalysisConfig;
/// use wave_stats::corpus::Corpus;
/// use wave_stats::pipeline::Pipeline;
/// use wave_stats::render::PlotRenderer;
///
/// let config = AnalysisConfig::default();
/// let corpus = Corpus::discover(Path::new("data"), &config.discovery).unwrap();
/// let pipeline = Pipeline::new(
///     Arc::new(WavSource::new()),
///     Arc::new(PlotRenderer::from_config(&config.output)),
///     config,
/// );
/// let hist = pipeline
///     .global_histogram(&corpus, Path::new("global_hist.png"))
///     .unwrap();
/// println!("{} samples in {} bins", hist.total(), hist.counts.len());
/// ```
pub struct Pipeline {
    source: Arc<dyn WaveformSource>,
    renderer: Arc<dyn Renderer>,
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn WaveformSource>,
        renderer: Arc<dyn Renderer>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            source,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Global histogram
    // -----------------------------------------------------------------------

    /// Both corpus passes, a bar chart at `outpath` and the counts as JSON
    /// next to it (`outpath` with a `.json` extension).
    ///
    /// Both destinations are checked before any file is decoded.
    pub fn global_histogram(
        &self,
        corpus: &Corpus,
        outpath: &Path,
    ) -> Result<GlobalHistogram, AnalysisError> {
        let sidecar = outpath.with_extension("json");
        prepare_file(outpath, self.config.output.overwrite)?;
        prepare_file(&sidecar, self.config.output.overwrite)?;

        let n_intervals = self.config.histogram.n_intervals;
        let jobs = self.config.runtime.jobs;
        log::info!(
            "{}: {} files, {n_intervals} intervals, {jobs} job(s)",
            Job::GlobalHistogram,
            corpus.len()
        );

        let hist = if jobs > 1 {
            block_on_global_histogram(Arc::clone(&self.source), corpus, n_intervals, jobs)?
        } else {
            GlobalHistogram::compute(self.source.as_ref(), corpus, n_intervals)?
        };

        self.renderer.histogram(
            &HistogramPlot {
                title: GLOBAL_TITLE,
                edges: &hist.edges,
                counts: &hist.counts,
            },
            outpath,
        )?;
        write_json(&sidecar, &hist)?;

        log::info!(
            "{}: {} samples binned -> {}",
            Job::GlobalHistogram,
            hist.total(),
            outpath.display()
        );
        Ok(hist)
    }

    // -----------------------------------------------------------------------
    // Per-file jobs
    // -----------------------------------------------------------------------

    /// `<stem>_hist.png` per file, binned over that file's own range.
    pub fn file_histograms(
        &self,
        corpus: &Corpus,
        outdir: &Path,
    ) -> Result<RunSummary, AnalysisError> {
        let bins = self.config.histogram.bins;
        self.per_file(
            Job::FileHistograms,
            corpus,
            outdir,
            serde_json::json!({ "bins": bins }),
            |path, waveform, layout| {
                let (edges, state) = file_histogram(path, &waveform, bins)?;
                let out = layout.mirrored(corpus, path, "_hist")?;
                self.renderer.histogram(
                    &HistogramPlot {
                        title: &display_name(path),
                        edges: &edges,
                        counts: state.counts(),
                    },
                    &out,
                )?;
                Ok(out)
            },
        )
    }

    /// Summary line per file through `reporter`, plus a histogram image
    /// titled `Amplitude histogram - <name>`.
    pub fn file_stats(
        &self,
        corpus: &Corpus,
        outdir: &Path,
        reporter: &mut dyn StatsReporter,
    ) -> Result<RunSummary, AnalysisError> {
        let bins = self.config.histogram.bins;
        self.per_file(
            Job::FileStats,
            corpus,
            outdir,
            serde_json::json!({ "bins": bins }),
            |path, waveform, layout| {
                let stats = FileStats::summarize(&waveform).map_err(|e| with_path(e, path))?;
                reporter.report(path, &stats);

                let (edges, state) = file_histogram(path, &waveform, bins)?;
                let out = layout.mirrored(corpus, path, "_hist")?;
                let title = format!("Amplitude histogram - {}", display_name(path));
                self.renderer.histogram(
                    &HistogramPlot {
                        title: &title,
                        edges: &edges,
                        counts: state.counts(),
                    },
                    &out,
                )?;
                Ok(out)
            },
        )
    }

    /// Waveform + energy figure `<stem>.png` per file.
    pub fn energy_plots(&self, corpus: &Corpus, outdir: &Path) -> Result<RunSummary, AnalysisError> {
        let segmenter = EnergySegmenter::new(self.config.energy.window_size)?;
        self.per_file(
            Job::EnergyPlots,
            corpus,
            outdir,
            serde_json::json!({ "window_size": segmenter.window_size() }),
            |path, waveform, layout| {
                let segments = segmenter.segment(&waveform);
                let name = display_name(path);
                println!("Processed {name} → {} segments", segments.len());

                let out = layout.mirrored(corpus, path, "")?;
                self.renderer.wave_and_energy(
                    &EnergyPlot {
                        title: &name,
                        waveform: &waveform,
                        segments: &segments,
                    },
                    &out,
                )?;
                Ok(out)
            },
        )
    }

    /// Prepare `outdir`, load each file in order and hand it to `each`, then
    /// write the manifest.  The first error aborts the run before the
    /// manifest is written.
    fn per_file<F>(
        &self,
        job: Job,
        corpus: &Corpus,
        outdir: &Path,
        parameters: serde_json::Value,
        mut each: F,
    ) -> Result<RunSummary, AnalysisError>
    where
        F: FnMut(&Path, Waveform, &OutputLayout) -> Result<std::path::PathBuf, AnalysisError>,
    {
        if corpus.is_empty() {
            return Err(AnalysisError::EmptyCollection {
                root: corpus.root().to_path_buf(),
            });
        }
        let layout = OutputLayout::prepare(outdir, self.config.output.overwrite)?;
        log::info!("{job}: {} files -> {}", corpus.len(), outdir.display());

        let mut artifacts = Vec::with_capacity(corpus.len());
        for path in corpus.files() {
            let waveform = self.source.load(path)?;
            log::debug!("{job}: {} ({} samples)", path.display(), waveform.len());
            artifacts.push(each(path.as_path(), waveform, &layout)?);
        }

        let manifest = layout.write_manifest(&RunManifest {
            job: job.label().to_string(),
            input: corpus.root().to_path_buf(),
            parameters,
            files: corpus.len(),
            artifacts: artifacts.clone(),
        })?;
        log::info!("{job}: wrote {} images", artifacts.len());

        Ok(RunSummary {
            job,
            files: corpus.len(),
            artifacts,
            manifest,
        })
    }
}

/// Histogram of one file over its own amplitude range.
fn file_histogram(
    path: &Path,
    waveform: &Waveform,
    bins: usize,
) -> Result<(BinEdges, HistogramState), AnalysisError> {
    let range = waveform.range().ok_or_else(|| AnalysisError::EmptyWaveform {
        path: Some(path.to_path_buf()),
    })?;
    let edges = BinEdges::for_samples(range, bins)?;
    let state = HistogramState::from_samples(&edges, &waveform.samples);
    Ok((edges, state))
}

/// Attach `path` to an [`AnalysisError::EmptyWaveform`] raised without one.
fn with_path(err: AnalysisError, path: &Path) -> AnalysisError {
    match err {
        AnalysisError::EmptyWaveform { path: None } => AnalysisError::EmptyWaveform {
            path: Some(path.to_path_buf()),
        },
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
