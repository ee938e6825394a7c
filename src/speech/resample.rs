//! Sample-rate conversion and channel fan-out for playback.
//!
//! Synthesized speech arrives as mono PCM at the rate requested from the
//! TTS service; the output device usually runs at 44.1 or 48 kHz with two
//! channels.  Conversion happens once, before the stream starts:
//!
//! 1. [`resample`]: `rubato` FFT resampler, mono, whole buffer.
//! 2. [`mono_to_interleaved`]: duplicate each sample across channels.

use rubato::{FftFixedIn, Resampler};

use crate::speech::synth::SpeechError;

/// Input frames per resampler call.
const CHUNK_FRAMES: usize = 1024;

/// Resample mono `samples` from `from_rate` to `to_rate`.
///
/// Same-rate input is returned unchanged.  The FFT resampler adds a short
/// leading delay; for speech this is inaudible.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, SpeechError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(SpeechError::Device(format!(
            "invalid sample rate conversion {from_rate} -> {to_rate}"
        )));
    }

    let mut resampler =
        FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_FRAMES, 2, 1)
            .map_err(|e| SpeechError::Device(e.to_string()))?;

    let expected = samples.len() as u64 * to_rate as u64 / from_rate as u64;
    let mut output = Vec::with_capacity(expected as usize + 2 * CHUNK_FRAMES);
    let mut pos = 0;

    loop {
        let needed = resampler.input_frames_next();
        if pos + needed > samples.len() {
            break;
        }
        let frames = resampler
            .process(&[&samples[pos..pos + needed]], None)
            .map_err(|e| SpeechError::Device(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
        pos += needed;
    }

    if pos < samples.len() {
        let frames = resampler
            .process_partial(Some(&[&samples[pos..]][..]), None)
            .map_err(|e| SpeechError::Device(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush the resampler's internal delay line.
    let tail = resampler
        .process_partial(None::<&[&[f32]]>, None)
        .map_err(|e| SpeechError::Device(e.to_string()))?;
    output.extend_from_slice(&tail[0]);

    Ok(output)
}

/// Duplicate mono samples across `channels` interleaved channels.
///
/// ```
/// use it_works_locally::speech::mono_to_interleaved;
///
/// assert_eq!(mono_to_interleaved(&[0.1, 0.2], 2), vec![0.1, 0.1, 0.2, 0.2]);
/// ```
pub fn mono_to_interleaved(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => samples
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(n as usize))
            .collect(),
    }
}
