//! Waveform file discovery.
//!
//! A [`Corpus`] is the resolved, sorted file list for one run.  Every stage
//! of a run receives the same `Corpus`, so the range scan and the histogram
//! accumulation can never disagree about which files they saw.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DiscoveryConfig;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// Root directory plus the waveform files found beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Corpus {
    /// Recursively collect files under `root` whose extension matches
    /// `config.extension` (case-insensitive), sort them, and keep the first
    /// `config.limit` entries.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Io`]: `root` (or a subdirectory) cannot be read.
    /// - [`AnalysisError::EmptyCollection`]: nothing matched.
    pub fn discover(root: &Path, config: &DiscoveryConfig) -> Result<Self, AnalysisError> {
        let extension = config.extension.trim_start_matches('.');
        let mut files = Vec::new();
        walk(root, extension, &mut files)?;
        files.sort();

        let found = files.len();
        if let Some(limit) = config.limit {
            files.truncate(limit);
        }
        if files.is_empty() {
            return Err(AnalysisError::EmptyCollection {
                root: root.to_path_buf(),
            });
        }

        log::info!(
            "discovered {found} .{extension} files under {} (using {})",
            root.display(),
            files.len()
        );
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Build a corpus from an explicit file list (kept in the given order).
    pub fn from_files(root: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `file` relative to the corpus root, or just its file name when it does
    /// not live under the root.
    pub fn relative(&self, file: &Path) -> PathBuf {
        match file.strip_prefix(&self.root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => file
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| file.to_path_buf()),
        }
    }
}

fn walk(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<(), AnalysisError> {
    let entries = fs::read_dir(dir).map_err(|e| AnalysisError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| AnalysisError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| AnalysisError::io(&path, e))?;

        if file_type.is_dir() {
            walk(&path, extension, out)?;
        } else if path.is_file() && has_extension(&path, extension) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn discovers_recursively_sorted_and_filtered() {
        let dir = tempdir().expect("temp dir");
        let root = dir.path();
        touch(&root.join("fold2/b.wav"));
        touch(&root.join("fold1/z.WAV"));
        touch(&root.join("fold1/a.wav"));
        touch(&root.join("fold1/notes.txt"));
        touch(&root.join("top.wav"));

        let corpus = Corpus::discover(root, &DiscoveryConfig::default()).unwrap();
        let rel: Vec<PathBuf> = corpus.files().iter().map(|f| corpus.relative(f)).collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("fold1/a.wav"),
                PathBuf::from("fold1/z.WAV"),
                PathBuf::from("fold2/b.wav"),
                PathBuf::from("top.wav"),
            ]
        );
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let dir = tempdir().expect("temp dir");
        for name in ["c.wav", "a.wav", "b.wav"] {
            touch(&dir.path().join(name));
        }
        let config = DiscoveryConfig {
            limit: Some(2),
            ..DiscoveryConfig::default()
        };
        let corpus = Corpus::discover(dir.path(), &config).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.files()[0].ends_with("a.wav"));
        assert!(corpus.files()[1].ends_with("b.wav"));
    }

    #[test]
    fn extension_with_leading_dot_accepted() {
        let dir = tempdir().expect("temp dir");
        touch(&dir.path().join("x.flac"));
        touch(&dir.path().join("y.wav"));
        let config = DiscoveryConfig {
            extension: ".flac".into(),
            ..DiscoveryConfig::default()
        };
        let corpus = Corpus::discover(dir.path(), &config).unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn nothing_matched_is_empty_collection() {
        let dir = tempdir().expect("temp dir");
        touch(&dir.path().join("readme.md"));
        let err = Corpus::discover(dir.path(), &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyCollection { .. }), "{err}");
    }

    #[test]
    fn missing_root_is_io_error() {
        let dir = tempdir().expect("temp dir");
        let err = Corpus::discover(&dir.path().join("nope"), &DiscoveryConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }), "{err}");
    }

    #[test]
    fn relative_falls_back_to_file_name() {
        let corpus = Corpus::from_files("/data/fold1", Vec::new());
        assert_eq!(
            corpus.relative(Path::new("/data/fold1/sub/a.wav")),
            PathBuf::from("sub/a.wav")
        );
        assert_eq!(
            corpus.relative(Path::new("/elsewhere/b.wav")),
            PathBuf::from("b.wav")
        );
    }
}
