//! Configuration module for It Works Locally.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the analysis
//! model, text-to-speech and the window, `AppPaths` for the settings file
//! location, and TOML persistence via `AppConfig::load` / `AppConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, LlmConfig, TtsConfig, UiConfig, ENV_LLM_API_KEY, ENV_TTS_API_KEY, ENV_TTS_VOICE_ID,
};
