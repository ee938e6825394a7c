//! It Works Locally: explains why code that runs on a developer machine
//! fails in production.
//!
//! * [`analysis`]: request / result types and the Gemini analysis adapter.
//! * [`speech`]: narration script, ElevenLabs synthesis and speaker output.
//! * [`pipeline`]: the lifecycle controller and the state the UI renders.
//! * [`config`]: TOML settings plus environment overrides.
//! * [`app`]: the egui window.

pub mod analysis;
pub mod app;
pub mod config;
pub mod pipeline;
pub mod speech;

#[cfg(test)]
pub(crate) mod test_support;
