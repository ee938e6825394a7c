//! `SpeechSynthesizer` trait and the ElevenLabs text-to-speech client.
//!
//! Audio is requested as raw 16-bit little-endian mono PCM
//! (`output_format=pcm_<rate>`) and decoded into `f32` samples, so the cpal
//! output path needs no compressed-audio decoder.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TtsConfig;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors from speech synthesis or playback.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("ElevenLabs API key not configured (set ELEVENLABS_API_KEY)")]
    MissingApiKey,

    #[error("ElevenLabs voice not configured (set ELEVENLABS_VOICE_ID)")]
    MissingVoiceId,

    #[error("Failed to generate speech: {0}")]
    Request(String),

    #[error("Failed to generate speech: the request timed out")]
    Timeout,

    #[error("Failed to generate speech: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to generate speech: the service returned no audio")]
    EmptyAudio,

    /// No usable output device, or the device rejected the stream.
    #[error("Audio device error: {0}")]
    Device(String),

    /// Playback started but failed.
    #[error("Audio playback error: {0}")]
    Playback(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesizedAudio
// ---------------------------------------------------------------------------

/// Mono PCM returned by a synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    /// Samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SynthesizedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode signed 16-bit little-endian PCM.  A trailing odd byte is ignored.
pub fn decode_pcm16le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32_768.0)
        .collect()
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, script: &str) -> Result<SynthesizedAudio, SpeechError>;
}

// ---------------------------------------------------------------------------
// ElevenLabsSynthesizer
// ---------------------------------------------------------------------------

/// Calls `POST {base_url}/v1/text-to-speech/{voice_id}`.
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    config: TtsConfig,
}

impl ElevenLabsSynthesizer {
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), SpeechError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(SpeechError::MissingApiKey)?;
        let voice = self.config.voice_id.trim();
        if voice.is_empty() {
            return Err(SpeechError::MissingVoiceId);
        }
        Ok((key, voice))
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format=pcm_{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id,
            self.config.sample_rate
        )
    }

    fn request_body(&self, script: &str) -> serde_json::Value {
        serde_json::json!({
            "text": script,
            "model_id": self.config.model_id,
            "voice_settings": {
                "stability": self.config.stability,
                "similarity_boost": self.config.similarity_boost
            }
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, script: &str) -> Result<SynthesizedAudio, SpeechError> {
        let (key, voice) = self.credentials()?;

        log::debug!("speech: synthesizing script of {} chars", script.len());

        let response = self
            .client
            .post(self.endpoint(voice))
            .header("xi-api-key", key)
            .header(reqwest::header::ACCEPT, "application/octet-stream")
            .json(&self.request_body(script))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("speech: service returned {status}: {body}");
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let samples = decode_pcm16le(&bytes);
        if samples.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let audio = SynthesizedAudio {
            samples,
            sample_rate: self.config.sample_rate,
        };
        log::debug!("speech: received {:.1}s of audio", audio.duration_secs());
        Ok(audio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
