//! Analysis lifecycle for It Works Locally.
//!
//! This module drives one analysis cycle at a time and exposes the shared
//! state that the UI reads every frame.
//!
//! # Architecture
//!
//! ```text
//! ControllerCommand (mpsc)
//!        │
//!        ▼
//! AnalysisController::run()  ← async tokio task
//!        │
//!        ├─ Analyze(request) → validate → spawn(ErrorAnalyzer::analyze)
//!        │                     + LoadingTicker (rotating messages)
//!        ├─ ToggleAudio      → SpeechSynthesizer → AudioSink::play
//!        └─ Reset            → cancel, release, back to Idle
//!
//! SharedState (Arc<Mutex<LifecycleState>>) ←─── read by egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use it_works_locally::analysis::{AnalysisRequest, ExpertiseLevel, GeminiAnalyzer};
//! use it_works_locally::config::AppConfig;
//! use it_works_locally::pipeline::{new_shared_state, AnalysisController, ControllerCommand};
//! use it_works_locally::speech::{CpalSink, ElevenLabsSynthesizer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default().with_env_overrides();
//!     let shared_state = new_shared_state();
//!
//!     let controller = AnalysisController::new(
//!         shared_state.clone(),
//!         Arc::new(GeminiAnalyzer::from_config(&config.llm)),
//!         Arc::new(ElevenLabsSynthesizer::from_config(&config.tts)),
//!         Arc::new(CpalSink::new()),
//!     );
//!
//!     let (command_tx, command_rx) = mpsc::channel(16);
//!     tokio::spawn(controller.run(command_rx));
//!
//!     let request = AnalysisRequest::new("panic: nil map", "", "", ExpertiseLevel::Intern);
//!     command_tx.send(ControllerCommand::Analyze(request)).await.unwrap();
//! }
//! ```

pub mod runner;
pub mod state;
pub mod ticker;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{AnalysisController, ControllerCommand, GENERIC_FAILURE};
pub use state::{lock_state, new_shared_state, LifecyclePhase, LifecycleState, SharedState};
pub use ticker::{LoadingTicker, DEFAULT_INTERVAL, LOADING_MESSAGES};
