//! `wave-stats` command-line entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`RUST_LOG` overrides the `info` default).
//! 2. Parse the command line.
//! 3. Load [`AnalysisConfig`] from `--config` or the platform settings file
//!    (defaults on first run), then apply command-line overrides.
//! 4. Discover the corpus under the input directory.
//! 5. Run the requested job and exit with status 1 on the first error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use wave_stats::{
    audio::WavSource,
    config::{AnalysisConfig, AppPaths},
    corpus::Corpus,
    pipeline::Pipeline,
    render::PlotRenderer,
    report::ConsoleReporter,
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Amplitude histograms, statistics and energy plots for folders of WAV files.
#[derive(Debug, Parser)]
#[command(name = "wave-stats", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Process only the first N files (sorted by path).
    #[arg(long, global = true, value_name = "N")]
    limit: Option<usize>,

    /// Files decoded concurrently by the global histogram.
    #[arg(long, global = true, value_name = "N")]
    jobs: Option<usize>,

    /// Replace existing output files and directories.
    #[arg(long, global = true)]
    overwrite: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// One histogram over every sample of every file.
    Global {
        input_dir: PathBuf,
        /// Number of equal-width bins.
        #[arg(long, value_name = "N")]
        n_intervals: Option<usize>,
        #[arg(long, value_name = "FILE", default_value = "global_hist.png")]
        outpath: PathBuf,
    },
    /// One histogram image per file, mirrored under OUTPUT_DIR.
    Histograms {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[arg(long, value_name = "N")]
        bins: Option<usize>,
    },
    /// Print duration and amplitude summary per file, plus a histogram image.
    Stats {
        input_dir: PathBuf,
        #[arg(long, value_name = "DIR", default_value = "histograms")]
        outdir: PathBuf,
        #[arg(long, value_name = "N")]
        bins: Option<usize>,
    },
    /// Waveform and per-segment energy figure per file.
    Energy {
        input_dir: PathBuf,
        #[arg(long, value_name = "DIR", default_value = "figures")]
        outdir: PathBuf,
        /// Samples per energy window.
        #[arg(long, value_name = "N")]
        window_size: Option<usize>,
    },
    /// Write the default settings file.
    InitConfig {
        /// Destination (defaults to the platform settings file).
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::InitConfig { path } = &cli.command {
        let path = path.clone().unwrap_or_else(|| AppPaths::new().settings_file);
        init_config(&path, cli.global.overwrite)?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let mut config = load_config(cli.global.config.as_deref())?;
    apply_overrides(&mut config, &cli.global, &cli.command);
    config.validate().context("invalid settings")?;

    let pipeline = Pipeline::new(
        Arc::new(WavSource::new()),
        Arc::new(PlotRenderer::from_config(&config.output)),
        config.clone(),
    );

    match &cli.command {
        Command::Global {
            input_dir, outpath, ..
        } => {
            let corpus = discover(input_dir, &config)?;
            let hist = pipeline.global_histogram(&corpus, outpath)?;
            if hist.out_of_range > 0 {
                log::warn!("{} samples fell outside the histogram range", hist.out_of_range);
            }
            println!(
                "Global histogram of {} samples from {} files -> {}",
                hist.total(),
                hist.files,
                outpath.display()
            );
        }
        Command::Histograms {
            input_dir,
            output_dir,
            ..
        } => {
            let corpus = discover(input_dir, &config)?;
            let summary = pipeline.file_histograms(&corpus, output_dir)?;
            println!("{} histograms -> {}", summary.artifacts.len(), output_dir.display());
        }
        Command::Stats {
            input_dir, outdir, ..
        } => {
            let corpus = discover(input_dir, &config)?;
            let mut reporter = ConsoleReporter;
            pipeline.file_stats(&corpus, outdir, &mut reporter)?;
        }
        Command::Energy {
            input_dir, outdir, ..
        } => {
            let corpus = discover(input_dir, &config)?;
            let summary = pipeline.energy_plots(&corpus, outdir)?;
            println!("{} figures -> {}", summary.artifacts.len(), outdir.display());
        }
        // written before any config was loaded
        Command::InitConfig { .. } => {}
    }
    Ok(())
}

/// Write the default settings to `path`, refusing to replace an existing
/// file unless `overwrite` is set.
fn init_config(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!(
            "settings file {} already exists (pass --overwrite to replace it)",
            path.display()
        );
    }
    AnalysisConfig::default().save_to(path)
}

/// An explicit `--config` must exist and parse; the default settings file
/// falls back to defaults with a warning.
fn load_config(explicit: Option<&Path>) -> Result<AnalysisConfig> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                bail!("settings file {} not found", path.display());
            }
            AnalysisConfig::load_from(path)
                .with_context(|| format!("loading settings from {}", path.display()))
        }
        None => Ok(AnalysisConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e:#}); using defaults");
            AnalysisConfig::default()
        })),
    }
}

fn apply_overrides(config: &mut AnalysisConfig, global: &GlobalOpts, command: &Command) {
    if let Some(limit) = global.limit {
        config.discovery.limit = Some(limit);
    }
    if let Some(jobs) = global.jobs {
        config.runtime.jobs = jobs;
    }
    if global.overwrite {
        config.output.overwrite = true;
    }

    match command {
        Command::Global {
            n_intervals: Some(n),
            ..
        } => config.histogram.n_intervals = *n,
        Command::Histograms { bins: Some(n), .. } | Command::Stats { bins: Some(n), .. } => {
            config.histogram.bins = *n
        }
        Command::Energy {
            window_size: Some(n),
            ..
        } => config.energy.window_size = *n,
        _ => {}
    }
}

fn discover(input_dir: &Path, config: &AnalysisConfig) -> Result<Corpus> {
    Corpus::discover(input_dir, &config.discovery)
        .with_context(|| format!("scanning {}", input_dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommand_flags_override_config() {
        let cli = Cli::parse_from([
            "wave-stats", "--jobs", "4", "--limit", "10", "global", "data", "--n-intervals", "64",
        ]);
        let mut config = AnalysisConfig::default();
        apply_overrides(&mut config, &cli.global, &cli.command);

        assert_eq!(config.runtime.jobs, 4);
        assert_eq!(config.discovery.limit, Some(10));
        assert_eq!(config.histogram.n_intervals, 64);
        assert!(!config.output.overwrite);
        match cli.command {
            Command::Global { outpath, .. } => assert_eq!(outpath, PathBuf::from("global_hist.png")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let cli = Cli::parse_from(["wave-stats", "energy", "data", "--overwrite", "--window-size", "256"]);
        let mut config = AnalysisConfig::default();
        apply_overrides(&mut config, &cli.global, &cli.command);

        assert!(config.output.overwrite);
        assert_eq!(config.energy.window_size, 256);
        match cli.command {
            Command::Energy { outdir, .. } => assert_eq!(outdir, PathBuf::from("figures")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn stats_defaults_to_histograms_dir() {
        let cli = Cli::parse_from(["wave-stats", "stats", "data", "--bins", "20"]);
        let mut config = AnalysisConfig::default();
        apply_overrides(&mut config, &cli.global, &cli.command);

        assert_eq!(config.histogram.bins, 20);
        match cli.command {
            Command::Stats { outdir, .. } => assert_eq!(outdir, PathBuf::from("histograms")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_config(Some(&dir.path().join("none.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"), "{err:#}");
    }

    #[test]
    fn explicit_partial_config_loads() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[histogram]\nbins = 32\n").unwrap();
        let cfg = load_config(Some(&path)).expect("load");
        assert_eq!(cfg.histogram.bins, 32);
        assert_eq!(cfg.energy.window_size, 100);
    }

    #[test]
    fn explicit_malformed_config_is_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[runtime\njobs =").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn init_config_refuses_existing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[histogram]\nbins = 7\n").unwrap();

        let err = init_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"), "{err:#}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[histogram]\nbins = 7\n");

        init_config(&path, true).expect("overwrite");
        assert_eq!(load_config(Some(&path)).unwrap().histogram.bins, 100);
    }

    #[test]
    fn init_config_creates_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/settings.toml");
        init_config(&path, false).expect("write");
        assert!(load_config(Some(&path)).is_ok());
    }
}
