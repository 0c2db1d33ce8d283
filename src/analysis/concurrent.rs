//! Concurrent variants of the two corpus passes.
//!
//! Files are decoded on tokio's blocking pool with at most `jobs` in flight.
//! Each task reduces its file to a small partial result (an
//! [`AmplitudeRange`] or a [`HistogramState`]) which is merged into the single
//! running total as tasks complete.  Completion order does not matter because
//! both merges are commutative and associative.
//!
//! The first failing file aborts the pass: remaining queued files are never
//! started and the outstanding tasks are dropped with the [`JoinSet`].

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::analysis::histogram::{warn_out_of_range, GlobalHistogram};
use crate::analysis::{range, AmplitudeRange, BinEdges, HistogramState};
use crate::audio::{Waveform, WaveformSource};
use crate::corpus::Corpus;
use crate::error::AnalysisError;

/// Decode every file with bounded concurrency and fold the mapped results.
async fn fold_files<T, A, M, F>(
    source: Arc<dyn WaveformSource>,
    corpus: &Corpus,
    jobs: usize,
    map: M,
    mut acc: A,
    mut merge: F,
) -> Result<A, AnalysisError>
where
    T: Send + 'static,
    M: Fn(&Waveform) -> T + Send + Sync + 'static,
    F: FnMut(&mut A, T),
{
    if corpus.is_empty() {
        return Err(AnalysisError::EmptyCollection {
            root: corpus.root().to_path_buf(),
        });
    }

    let jobs = jobs.max(1);
    let map = Arc::new(map);
    let mut tasks: JoinSet<Result<T, AnalysisError>> = JoinSet::new();

    for path in corpus.files() {
        if tasks.len() >= jobs {
            if let Some(joined) = tasks.join_next().await {
                merge(&mut acc, flatten(joined)?);
            }
        }
        tasks.spawn_blocking(spawn_one(Arc::clone(&source), Arc::clone(&map), path.clone()));
    }

    while let Some(joined) = tasks.join_next().await {
        merge(&mut acc, flatten(joined)?);
    }
    Ok(acc)
}

fn spawn_one<T, M>(
    source: Arc<dyn WaveformSource>,
    map: Arc<M>,
    path: PathBuf,
) -> impl FnOnce() -> Result<T, AnalysisError> + Send + 'static
where
    T: Send + 'static,
    M: Fn(&Waveform) -> T + Send + Sync + 'static,
{
    move || {
        let waveform = source.load(&path)?;
        log::debug!("worker: {} ({} samples)", path.display(), waveform.len());
        Ok(map(&waveform))
    }
}

fn flatten<T>(
    joined: Result<Result<T, AnalysisError>, tokio::task::JoinError>,
) -> Result<T, AnalysisError> {
    joined.map_err(|e| AnalysisError::Worker(e.to_string()))?
}

/// Concurrent [`RangeScanner::scan`](crate::analysis::RangeScanner::scan).
pub async fn scan_concurrent(
    source: Arc<dyn WaveformSource>,
    corpus: &Corpus,
    jobs: usize,
) -> Result<AmplitudeRange, AnalysisError> {
    let folded = fold_files(
        source,
        corpus,
        jobs,
        |wf: &Waveform| wf.range(),
        AmplitudeRange::EMPTY,
        |acc: &mut AmplitudeRange, local: Option<AmplitudeRange>| {
            if let Some(local) = local {
                *acc = acc.merge(local);
            }
        },
    )
    .await?;
    range::finish(folded, corpus)
}

/// Concurrent [`HistogramAccumulator::accumulate`](crate::analysis::HistogramAccumulator::accumulate).
pub async fn accumulate_concurrent(
    source: Arc<dyn WaveformSource>,
    corpus: &Corpus,
    edges: &BinEdges,
    jobs: usize,
) -> Result<HistogramState, AnalysisError> {
    let shared = Arc::new(edges.clone());
    let total = fold_files(
        source,
        corpus,
        jobs,
        move |wf: &Waveform| HistogramState::from_samples(&shared, &wf.samples),
        HistogramState::new(edges.intervals()),
        |acc: &mut HistogramState, part: HistogramState| acc.merge(&part),
    )
    .await?;
    warn_out_of_range(&total);
    Ok(total)
}

/// Both passes, each with up to `jobs` files decoding at once.
pub async fn global_histogram_concurrent(
    source: Arc<dyn WaveformSource>,
    corpus: &Corpus,
    n_intervals: usize,
    jobs: usize,
) -> Result<GlobalHistogram, AnalysisError> {
    if n_intervals == 0 {
        return Err(AnalysisError::InvalidIntervals(n_intervals));
    }
    let range = scan_concurrent(Arc::clone(&source), corpus, jobs).await?;
    let edges = BinEdges::from_range(range, n_intervals)?;
    let state = accumulate_concurrent(source, corpus, &edges, jobs).await?;
    Ok(GlobalHistogram::assemble(range, edges, state, corpus))
}

/// Run [`global_histogram_concurrent`] on a private runtime.
///
/// The runtime is single-threaded for coordination; decoding happens on its
/// blocking pool, capped at `jobs` threads.  A caller already inside a tokio
/// runtime cannot block on a nested one, so in that case the private runtime
/// is driven from a scoped helper thread instead.
pub fn block_on_global_histogram(
    source: Arc<dyn WaveformSource>,
    corpus: &Corpus,
    n_intervals: usize,
    jobs: usize,
) -> Result<GlobalHistogram, AnalysisError> {
    if tokio::runtime::Handle::try_current().is_err() {
        return run_private(source, corpus, n_intervals, jobs);
    }

    log::debug!("ambient runtime detected; running histogram passes on a helper thread");
    std::thread::scope(|scope| {
        scope
            .spawn(move || run_private(source, corpus, n_intervals, jobs))
            .join()
            .unwrap_or_else(|_| Err(AnalysisError::Worker("histogram thread panicked".into())))
    })
}

fn run_private(
    source: Arc<dyn WaveformSource>,
    corpus: &Corpus,
    n_intervals: usize,
    jobs: usize,
) -> Result<GlobalHistogram, AnalysisError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .max_blocking_threads(jobs.max(1))
        .enable_all()
        .build()
        .map_err(|e| AnalysisError::Worker(format!("failed to start runtime: {e}")))?;
    rt.block_on(global_histogram_concurrent(source, corpus, n_intervals, jobs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemorySource;

    fn corpus(n: usize) -> (MemorySource, Corpus) {
        let mut src = MemorySource::new();
        let mut files = Vec::new();
        for i in 0..n {
            let name = format!("f{i:02}.wav");
            let samples: Vec<f32> = (0..50)
                .map(|k| ((i * 50 + k) as f32 * 0.037).sin() * (0.2 + i as f32 * 0.05))
                .collect();
            src = src.with(name.as_str(), samples, 8_000);
            files.push(PathBuf::from(name));
        }
        (src, Corpus::from_files("data", files))
    }

    #[tokio::test]
    async fn concurrent_matches_sequential() {
        let (src, files) = corpus(12);
        let sequential = GlobalHistogram::compute(&src, &files, 64).unwrap();

        let shared: Arc<dyn WaveformSource> = Arc::new(src);
        let concurrent = global_histogram_concurrent(shared, &files, 64, 4).await.unwrap();

        assert_eq!(concurrent, sequential);
        assert_eq!(concurrent.total(), 12 * 50);
    }

    #[tokio::test]
    async fn concurrent_scan_empty_corpus() {
        let shared: Arc<dyn WaveformSource> = Arc::new(MemorySource::new());
        let err = scan_concurrent(shared, &Corpus::from_files("data", Vec::new()), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyCollection { .. }), "{err}");
    }

    #[tokio::test]
    async fn concurrent_fails_fast_on_corrupt_file() {
        let (src, files) = corpus(6);
        let src = src.with_corrupt("bad.wav");
        let mut paths = files.files().to_vec();
        paths.insert(3, PathBuf::from("bad.wav"));
        let files = Corpus::from_files("data", paths);

        let shared: Arc<dyn WaveformSource> = Arc::new(src);
        let err = accumulate_concurrent(shared, &files, &BinEdges::build(-1.0, 1.0, 8).unwrap(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Decode { .. }), "{err}");
    }

    #[test]
    fn blocking_entry_point_runs_its_own_runtime() {
        let (src, files) = corpus(5);
        let shared: Arc<dyn WaveformSource> = Arc::new(src);
        let hist = block_on_global_histogram(shared, &files, 20, 2).unwrap();
        assert_eq!(hist.total(), 250);
        assert_eq!(hist.files, 5);
    }

    #[tokio::test]
    async fn blocking_entry_point_inside_runtime() {
        let (src, files) = corpus(5);
        let sequential = GlobalHistogram::compute(&src, &files, 20).unwrap();

        let shared: Arc<dyn WaveformSource> = Arc::new(src);
        let hist = block_on_global_histogram(shared, &files, 20, 2).unwrap();
        assert_eq!(hist, sequential);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_entry_point_inside_multi_thread_runtime() {
        let (src, files) = corpus(5);
        let shared: Arc<dyn WaveformSource> = Arc::new(src);
        let hist = block_on_global_histogram(shared, &files, 20, 3).unwrap();
        assert_eq!(hist.total(), 250);
    }
}
