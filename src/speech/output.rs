//! Speaker output via `cpal`.
//!
//! [`CpalSink`] plays one [`SynthesizedAudio`] per call on a dedicated
//! thread that owns the `cpal::Stream` (which is not `Send` on every
//! platform).  The returned [`Playback`] stops the thread on release.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::oneshot;

use crate::speech::playback::{AudioSink, Playback, PlaybackEnd};
use crate::speech::resample::{mono_to_interleaved, resample};
use crate::speech::synth::{SpeechError, SynthesizedAudio};

/// Messages delivered to the playback thread.
enum StreamEvent {
    Drained,
    Stop,
    Failed(String),
}

/// Default-output-device sink.
#[derive(Debug, Default, Clone)]
pub struct CpalSink;

impl CpalSink {
    pub fn new() -> Self {
        Self
    }
}

impl AudioSink for CpalSink {
    fn play(&self, audio: SynthesizedAudio) -> Result<Playback, SpeechError> {
        let (event_tx, event_rx) = mpsc::channel::<StreamEvent>();
        let (ended_tx, ended_rx) = oneshot::channel::<PlaybackEnd>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), SpeechError>>();

        let callback_tx = event_tx.clone();
        std::thread::Builder::new()
            .name("tts-playback".into())
            .spawn(move || {
                let stream = match open_stream(audio, callback_tx) {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let end = match event_rx.recv() {
                    Ok(StreamEvent::Drained) => PlaybackEnd::Completed,
                    Ok(StreamEvent::Failed(msg)) => PlaybackEnd::Failed(msg),
                    Ok(StreamEvent::Stop) | Err(_) => PlaybackEnd::Stopped,
                };
                drop(stream);
                log::debug!("speech: playback ended ({end:?})");
                let _ = ended_tx.send(end);
            })
            .map_err(|e| SpeechError::Device(format!("failed to spawn playback thread: {e}")))?;

        // Surface device errors to the caller instead of a silent no-op.
        ready_rx
            .recv()
            .map_err(|_| SpeechError::Device("playback thread exited early".into()))??;

        Ok(Playback::new(ended_rx, move || {
            let _ = event_tx.send(StreamEvent::Stop);
        }))
    }
}

/// Build and start an output stream that plays `audio` once.
fn open_stream(
    audio: SynthesizedAudio,
    events: mpsc::Sender<StreamEvent>,
) -> Result<cpal::Stream, SpeechError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| SpeechError::Device("no output device found".into()))?;

    let supported = device
        .default_output_config()
        .map_err(|e| SpeechError::Device(e.to_string()))?;
    let channels = supported.channels();
    let device_rate = supported.sample_rate().0;
    let config: cpal::StreamConfig = supported.into();

    let mono = resample(&audio.samples, audio.sample_rate, device_rate)?;
    let samples = mono_to_interleaved(&mono, channels);
    log::debug!(
        "speech: playing {} frames @ {device_rate} Hz, {channels} ch",
        mono.len()
    );

    let mut cursor = 0usize;
    let drained = Arc::new(AtomicBool::new(false));
    let error_tx = events.clone();

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let available = samples.len().saturating_sub(cursor);
                let n = available.min(data.len());
                data[..n].copy_from_slice(&samples[cursor..cursor + n]);
                data[n..].fill(0.0);
                cursor += n;

                if cursor >= samples.len() && !drained.swap(true, Ordering::SeqCst) {
                    let _ = events.send(StreamEvent::Drained);
                }
            },
            move |err: cpal::StreamError| {
                log::error!("cpal output stream error: {err}");
                let _ = error_tx.send(StreamEvent::Failed(err.to_string()));
            },
            None,
        )
        .map_err(|e| SpeechError::Device(e.to_string()))?;

    stream
        .play()
        .map_err(|e| SpeechError::Device(e.to_string()))?;

    Ok(stream)
}
