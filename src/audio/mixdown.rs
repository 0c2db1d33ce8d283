//! Channel mixing for ingestion.
//!
//! Analysis never looks at individual channels: every source is reduced to
//! mono by a plain arithmetic mean of the channels in each frame.

// ---------------------------------------------------------------------------
// downmix
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`; a trailing incomplete
/// frame is ignored.
///
/// * If `channels == 1` the input is copied unchanged.
/// * If `channels == 0` an empty vector is returned.
///
/// # Example
///
/// ```rust
/// use wave_stats::audio::downmix;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = downmix(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
