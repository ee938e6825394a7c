//! Application entry point: It Works Locally.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults written on first run), then apply the
//!    credential environment variables.
//! 3. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the analysis, speech and audio adapters from config.
//! 5. Spawn the analysis controller on the runtime.
//! 6. Run [`eframe::run_native`]: blocks the main thread until the window
//!    is closed.

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use it_works_locally::{
    analysis::{ErrorAnalyzer, GeminiAnalyzer},
    app::ItWorksLocallyApp,
    config::AppConfig,
    pipeline::{new_shared_state, AnalysisController, ControllerCommand},
    speech::{AudioSink, CpalSink, ElevenLabsSynthesizer, SpeechSynthesizer},
};

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let viewport = egui::ViewportBuilder::default()
        .with_title("It Works Locally")
        .with_inner_size([width, height])
        .with_min_inner_size([520.0, 420.0]);

    eframe::NativeOptions {
        viewport,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("It Works Locally starting up");

    // 2. Configuration
    let config = AppConfig::load()
        .unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        })
        .with_env_overrides();

    if config.llm.api_key.is_none() {
        log::warn!("No Gemini API key configured; analyses will fail until one is set");
    }
    if config.tts.api_key.is_none() {
        log::warn!("No ElevenLabs API key configured; narration is unavailable");
    }

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // 4. Adapters
    let analyzer: Arc<dyn ErrorAnalyzer> = Arc::new(GeminiAnalyzer::from_config(&config.llm));
    let synthesizer: Arc<dyn SpeechSynthesizer> =
        Arc::new(ElevenLabsSynthesizer::from_config(&config.tts));
    let sink: Arc<dyn AudioSink> = Arc::new(CpalSink::new());

    // 5. Controller
    let shared_state = new_shared_state();
    let (command_tx, command_rx) = mpsc::channel::<ControllerCommand>(16);
    let controller = AnalysisController::new(shared_state.clone(), analyzer, synthesizer, sink)
        .with_loading_interval(Duration::from_millis(config.ui.loading_interval_ms.max(1)));
    rt.spawn(controller.run(command_rx));

    // 6. UI (blocks until the window is closed)
    let options = native_options(&config);
    let app = ItWorksLocallyApp::new(shared_state, command_tx, config);

    eframe::run_native(
        "It Works Locally",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {e}"))?;

    // Cancels the controller, which releases any playback.
    rt.shutdown_timeout(Duration::from_secs(2));
    log::info!("It Works Locally shut down");
    Ok(())
}
