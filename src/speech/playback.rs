//! Playback handle and the `AudioSink` seam.
//!
//! A [`Playback`] pairs the end-of-playback signal with an explicit release
//! function.  Whoever owns the `Playback` owns the audio resource: calling
//! [`Playback::release`] (or dropping it) stops the sound and frees the
//! device stream.

use tokio::sync::oneshot;

use crate::speech::synth::{SpeechError, SynthesizedAudio};

/// How a playback finished.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEnd {
    /// All samples were played.
    Completed,
    /// Released before the end.
    Stopped,
    /// The output stream reported an error.
    Failed(String),
}

/// An active audio resource and its release function.
pub struct Playback {
    ended: oneshot::Receiver<PlaybackEnd>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Playback {
    pub fn new<F>(ended: oneshot::Receiver<PlaybackEnd>, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            ended,
            release: Some(Box::new(release)),
        }
    }

    /// Wait until the sink reports the end of playback.
    ///
    /// A sink that goes away without reporting counts as `Stopped`.  Must
    /// not be awaited again after it has returned.
    pub async fn ended(&mut self) -> PlaybackEnd {
        (&mut self.ended).await.unwrap_or(PlaybackEnd::Stopped)
    }

    /// Stop playback and free the resource.  Idempotent.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Playback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Something that can play synthesized audio, one call per resource.
pub trait AudioSink: Send + Sync {
    fn play(&self, audio: SynthesizedAudio) -> Result<Playback, SpeechError>;
}
