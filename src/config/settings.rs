//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Credentials usually come from the environment rather than the settings
//! file; see [`AppConfig::with_env_overrides`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::analysis::ExpertiseLevel;

/// Environment variable holding the Gemini API key.
pub const ENV_LLM_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable holding the ElevenLabs API key.
pub const ENV_TTS_API_KEY: &str = "ELEVENLABS_API_KEY";
/// Environment variable holding the ElevenLabs voice identifier.
pub const ENV_TTS_VOICE_ID: &str = "ELEVENLABS_VOICE_ID";

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the error-analysis model (Gemini `generateContent`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the API endpoint, without the `/v1beta/...` path.
    pub base_url: String,
    /// API key; `None` until provided by the settings file or
    /// `GEMINI_API_KEY`.
    pub api_key: Option<String>,
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            model: "gemini-2.0-flash".into(),
            temperature: 0.4,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for the ElevenLabs text-to-speech step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Base URL of the API endpoint, without the `/v1/...` path.
    pub base_url: String,
    /// API key; `None` until provided by the settings file or
    /// `ELEVENLABS_API_KEY`.
    pub api_key: Option<String>,
    /// Voice used for narration.
    pub voice_id: String,
    /// Synthesis model identifier.
    pub model_id: String,
    /// Voice stability (0.0 – 1.0).
    pub stability: f32,
    /// Similarity boost (0.0 – 1.0).
    pub similarity_boost: f32,
    /// PCM sample rate requested from the service (`pcm_<rate>` output
    /// format).  ElevenLabs accepts 16000, 22050, 24000 and 44100.
    pub sample_rate: u32,
    /// Maximum seconds to wait for synthesized audio.
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".into(),
            api_key: None,
            voice_id: "21m00Tcm4TlvDq8ikWAM".into(),
            model_id: "eleven_multilingual_v2".into(),
            stability: 0.5,
            similarity_boost: 0.75,
            sample_rate: 22_050,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Expertise level pre-selected in the form.
    pub default_expertise: ExpertiseLevel,
    /// Milliseconds between loading-message rotations.
    pub loading_interval_ms: u64,
    /// Initial window size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_expertise: ExpertiseLevel::default(),
            loading_interval_ms: 2_000,
            window_size: (900.0, 760.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use it_works_locally::config::AppConfig;
///
/// // Load (writing the defaults on first run), then let the
/// // environment fill in credentials.
/// let config = AppConfig::load().unwrap().with_env_overrides();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Error-analysis model settings.
    pub llm: LlmConfig,
    /// Text-to-speech settings.
    pub tts: TtsConfig,
    /// Window / presentation settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// On first run the defaults are written there for the user to edit.
    pub fn load() -> Result<Self> {
        Self::load_or_init_at(&AppPaths::new().settings_file)
    }

    /// Load from `path`, or write the defaults to it when it is missing.
    ///
    /// Failing to write the defaults is logged and not fatal.  Call this
    /// before applying environment overrides so credentials stay off disk.
    pub fn load_or_init_at(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        match config.save_to(path) {
            Ok(()) => log::info!("config: wrote default settings to {}", path.display()),
            Err(e) => log::warn!(
                "config: could not write default settings to {}: {e}",
                path.display()
            ),
        }
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply credential overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply credential overrides from an arbitrary lookup.
    ///
    /// Only non-empty values replace what the settings file provided.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_LLM_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = non_empty(ENV_TTS_API_KEY) {
            self.tts.api_key = Some(key);
        }
        if let Some(voice) = non_empty(ENV_TTS_VOICE_ID) {
            self.tts.voice_id = voice;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.api_key, loaded.llm.api_key);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);

        assert_eq!(original.tts.voice_id, loaded.tts.voice_id);
        assert_eq!(original.tts.model_id, loaded.tts.model_id);
        assert_eq!(original.tts.sample_rate, loaded.tts.sample_rate);
        assert_eq!(original.tts.stability, loaded.tts.stability);

        assert_eq!(original.ui.default_expertise, loaded.ui.default_expertise);
        assert_eq!(
            original.ui.loading_interval_ms,
            loaded.ui.loading_interval_ms
        );
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert!(config.llm.api_key.is_none());
        assert!(config.tts.api_key.is_none());
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let config = AppConfig::load_or_init_at(&path).expect("load");
        assert!(path.exists());
        assert_eq!(config.llm.model, "gemini-2.0-flash");

        let written = std::fs::read_to_string(&path).expect("read");
        assert!(!written.contains("api_key"));
        let reloaded = AppConfig::load_from(&path).expect("reload");
        assert_eq!(reloaded.tts.voice_id, config.tts.voice_id);
    }

    #[test]
    fn existing_settings_are_not_overwritten() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let mut custom = AppConfig::default();
        custom.llm.model = "gemini-1.5-pro".into();
        custom.save_to(&path).expect("save");

        let loaded = AppConfig::load_or_init_at(&path).expect("load");
        assert_eq!(loaded.llm.model, "gemini-1.5-pro");
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.contains("gemini-1.5-pro"));
    }

    #[test]
    fn unwritable_location_still_yields_defaults() {
        let dir = tempdir().expect("temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").expect("write");
        let path = blocker.join("settings.toml");

        let config = AppConfig::load_or_init_at(&path).expect("defaults");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert!(!path.exists());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.llm.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.tts.base_url, "https://api.elevenlabs.io");
        assert_eq!(cfg.tts.voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(cfg.tts.model_id, "eleven_multilingual_v2");
        assert_eq!(cfg.tts.sample_rate, 22_050);
        assert_eq!(cfg.ui.default_expertise, ExpertiseLevel::Junior);
        assert_eq!(cfg.ui.loading_interval_ms, 2_000);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.llm.api_key = Some("gm-test".into());
        cfg.llm.model = "gemini-1.5-pro".into();
        cfg.tts.voice_id = "custom-voice".into();
        cfg.tts.sample_rate = 44_100;
        cfg.ui.default_expertise = ExpertiseLevel::Intern;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.llm.api_key.as_deref(), Some("gm-test"));
        assert_eq!(loaded.llm.model, "gemini-1.5-pro");
        assert_eq!(loaded.tts.voice_id, "custom-voice");
        assert_eq!(loaded.tts.sample_rate, 44_100);
        assert_eq!(loaded.ui.default_expertise, ExpertiseLevel::Intern);
    }

    #[test]
    fn env_overrides_fill_credentials() {
        let cfg = AppConfig::default().with_overrides_from(lookup_from(&[
            (ENV_LLM_API_KEY, "gm-key"),
            (ENV_TTS_API_KEY, "el-key"),
            (ENV_TTS_VOICE_ID, "voice-42"),
        ]));

        assert_eq!(cfg.llm.api_key.as_deref(), Some("gm-key"));
        assert_eq!(cfg.tts.api_key.as_deref(), Some("el-key"));
        assert_eq!(cfg.tts.voice_id, "voice-42");
    }

    #[test]
    fn blank_env_values_do_not_override() {
        let mut base = AppConfig::default();
        base.llm.api_key = Some("from-file".into());

        let cfg = base.with_overrides_from(lookup_from(&[
            (ENV_LLM_API_KEY, "   "),
            (ENV_TTS_VOICE_ID, ""),
        ]));

        assert_eq!(cfg.llm.api_key.as_deref(), Some("from-file"));
        assert_eq!(cfg.tts.voice_id, "21m00Tcm4TlvDq8ikWAM");
    }

    #[test]
    fn missing_env_leaves_config_untouched() {
        let cfg = AppConfig::default().with_overrides_from(|_| None);
        assert!(cfg.llm.api_key.is_none());
        assert!(cfg.tts.api_key.is_none());
    }
}
