//! Spoken explanation of an analysis result.
//!
//! # Pipeline
//!
//! ```text
//! AnalysisResult → narration_script → SpeechSynthesizer (ElevenLabs, PCM)
//!               → AudioSink (cpal: resample → interleave → output stream)
//!               → Playback { ended, release }
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use it_works_locally::config::AppConfig;
//! use it_works_locally::speech::{AudioSink, CpalSink, ElevenLabsSynthesizer, SpeechSynthesizer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default().with_env_overrides();
//!     let synth = ElevenLabsSynthesizer::from_config(&config.tts);
//!     let audio = synth.synthesize("It works on my machine.").await.unwrap();
//!
//!     let mut playback = CpalSink::new().play(audio).unwrap();
//!     playback.ended().await; // dropping `playback` stops the sound early
//! }
//! ```

pub mod output;
pub mod playback;
pub mod resample;
pub mod script;
pub mod synth;

pub use output::CpalSink;
pub use playback::{AudioSink, Playback, PlaybackEnd};
pub use resample::{mono_to_interleaved, resample};
pub use script::{narration_script, strip_step_prefix, FALLBACK_SUMMARY};
pub use synth::{
    decode_pcm16le, ElevenLabsSynthesizer, SpeechError, SpeechSynthesizer, SynthesizedAudio,
};
