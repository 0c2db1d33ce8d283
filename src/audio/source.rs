//! Waveform decoding seam.
//!
//! [`WaveformSource`] is the only way the analysis stages obtain samples.  It
//! is object-safe and `Send + Sync` so one decoder can be shared behind an
//! `Arc<dyn WaveformSource>` by the concurrent passes.
//!
//! [`WavSource`] is the production implementation (PCM / IEEE-float WAV via
//! `hound`).  [`MemorySource`] (available under `#[cfg(test)]`) serves
//! in-memory fixtures and can simulate corrupt files.

use std::path::Path;

use crate::audio::Waveform;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// WaveformSource trait
// ---------------------------------------------------------------------------

/// Decodes a file into a mono [`Waveform`].
///
/// # Contract
///
/// - The returned waveform is already mono (channels averaged).
/// - Any failure to read or interpret the file is reported as
///   [`AnalysisError::Decode`] naming `path`.
pub trait WaveformSource: Send + Sync {
    /// Load `path` and return its mono samples and sample rate.
    fn load(&self, path: &Path) -> Result<Waveform, AnalysisError>;
}

// Compile-time assertion: Box<dyn WaveformSource> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn WaveformSource>) {}
};

// ---------------------------------------------------------------------------
// WavSource
// ---------------------------------------------------------------------------

/// `hound`-backed WAV decoder.
///
/// Integer PCM is normalised by `2^(bits - 1)` so 16-bit full scale maps to
/// `[-1.0, 1.0)`; 32-bit float data is passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavSource;

impl WavSource {
    pub fn new() -> Self {
        Self
    }
}

impl WaveformSource for WavSource {
    fn load(&self, path: &Path) -> Result<Waveform, AnalysisError> {
        let mut reader =
            hound::WavReader::open(path).map_err(|e| AnalysisError::decode(path, e))?;
        let spec = reader.spec();

        if spec.sample_rate == 0 {
            return Err(AnalysisError::decode(path, "sample rate is zero"));
        }
        if spec.channels == 0 {
            return Err(AnalysisError::decode(path, "file declares zero channels"));
        }

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, bits @ 1..=32) => {
                let scale = 1.0 / (1u64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| AnalysisError::decode(path, e))?
            }
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| AnalysisError::decode(path, e))?,
            (format, bits) => {
                return Err(AnalysisError::decode(
                    path,
                    format!("unsupported sample format {format:?} / {bits} bits"),
                ));
            }
        };

        log::trace!(
            "decoded {} ({} ch, {} Hz, {} frames)",
            path.display(),
            spec.channels,
            spec.sample_rate,
            interleaved.len() / spec.channels as usize
        );

        Ok(Waveform::from_interleaved(
            &interleaved,
            spec.channels,
            spec.sample_rate,
        ))
    }
}

// ---------------------------------------------------------------------------
// MemorySource (test double)
// ---------------------------------------------------------------------------

/// In-memory [`WaveformSource`] keyed by path.
///
/// Counts every `load` call so tests can check how often the corpus is read.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySource {
    files: std::collections::HashMap<std::path::PathBuf, Option<Waveform>>,
    loads: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mono fixture.
    pub fn with(mut self, path: impl Into<std::path::PathBuf>, samples: Vec<f32>, rate: u32) -> Self {
        self.files
            .insert(path.into(), Some(Waveform::new(samples, rate)));
        self
    }

    /// Register a path that fails to decode.
    pub fn with_corrupt(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.files.insert(path.into(), None);
        self
    }

    /// Total number of `load` calls so far.
    pub fn loads(&self) -> usize {
        self.loads.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl WaveformSource for MemorySource {
    fn load(&self, path: &Path) -> Result<Waveform, AnalysisError> {
        self.loads
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match self.files.get(path) {
            Some(Some(wf)) => Ok(wf.clone()),
            Some(None) => Err(AnalysisError::decode(path, "corrupt fixture")),
            None => Err(AnalysisError::decode(path, "no such fixture")),
        }
    }
}

/// Write `frames` (interleaved, `channels` wide) as a 16-bit PCM WAV.
#[cfg(test)]
pub(crate) fn write_wav_i16(path: &Path, interleaved: &[f32], channels: u16, sample_rate: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &s in interleaved {
        writer
            .write_sample((s * 32_768.0).clamp(-32_768.0, 32_767.0) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn wav_source_reads_mono_pcm16() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("tone.wav");
        write_wav_i16(&path, &[0.0, 0.5, -0.5, 0.25], 1, 8_000);

        let wf = WavSource::new().load(&path).expect("decode");
        assert_eq!(wf.sample_rate, 8_000);
        assert_eq!(wf.samples, vec![0.0, 0.5, -0.5, 0.25]);
    }

    #[test]
    fn wav_source_downmixes_stereo() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("stereo.wav");
        // frames: (0.5, -0.5), (0.25, 0.75)
        write_wav_i16(&path, &[0.5, -0.5, 0.25, 0.75], 2, 16_000);

        let wf = WavSource::new().load(&path).expect("decode");
        assert_eq!(wf.len(), 2);
        assert!((wf.samples[0] - 0.0).abs() < 1e-6);
        assert!((wf.samples[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wav_source_reads_float32() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create");
        for s in [0.1_f32, -0.9, 0.3] {
            writer.write_sample(s).expect("write");
        }
        writer.finalize().expect("finalize");

        let wf = WavSource::new().load(&path).expect("decode");
        assert_eq!(wf.samples, vec![0.1, -0.9, 0.3]);
    }

    #[test]
    fn garbage_file_is_decode_error_naming_path() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not RIFF data").expect("write");

        let err = WavSource::new().load(&path).unwrap_err();
        match err {
            AnalysisError::Decode { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = WavSource::new()
            .load(Path::new("/no/such/dir/missing.wav"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Decode { .. }), "{err}");
    }

    #[test]
    fn memory_source_counts_loads_and_fails_corrupt() {
        let src = MemorySource::new()
            .with("a.wav", vec![0.1, 0.2], 10)
            .with_corrupt("bad.wav");

        assert!(src.load(Path::new("a.wav")).is_ok());
        assert!(src.load(Path::new("bad.wav")).is_err());
        assert!(src.load(Path::new("unknown.wav")).is_err());
        assert_eq!(src.loads(), 3);
    }
}
