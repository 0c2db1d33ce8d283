//! Where per-file statistics lines go.

use std::path::{Path, PathBuf};

use crate::analysis::FileStats;

/// Receives one [`FileStats`] per processed file, in corpus order.
pub trait StatsReporter {
    fn report(&mut self, path: &Path, stats: &FileStats);
}

/// Prints [`FileStats::summary_line`] to stdout, keyed by file name.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl StatsReporter for ConsoleReporter {
    fn report(&mut self, path: &Path, stats: &FileStats) {
        println!("{}", stats.summary_line(&display_name(path)));
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub entries: Vec<(PathBuf, FileStats)>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary lines as [`ConsoleReporter`] would print them.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(path, stats)| stats.summary_line(&display_name(path)))
            .collect()
    }
}

impl StatsReporter for CollectingReporter {
    fn report(&mut self, path: &Path, stats: &FileStats) {
        self.entries.push((path.to_path_buf(), *stats));
    }
}

/// Base name of `path`, or the whole path when it has none.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Waveform;

    #[test]
    fn collecting_reporter_formats_like_console() {
        let stats = FileStats::summarize(&Waveform::new(vec![-0.5, 0.25, 0.75, 0.0], 2)).unwrap();
        let mut reporter = CollectingReporter::new();
        reporter.report(Path::new("fold1/dog.wav"), &stats);

        assert_eq!(reporter.entries.len(), 1);
        assert_eq!(
            reporter.lines(),
            vec!["dog.wav | dur: 2.00s | amp(min,max,mean)=(-0.500,0.750,0.375)".to_string()]
        );
    }

    #[test]
    fn display_name_falls_back_to_path() {
        assert_eq!(display_name(Path::new("a/b/c.wav")), "c.wav");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
