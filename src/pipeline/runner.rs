//! Analysis controller: drives submit → analyze → present → narrate.
//!
//! [`AnalysisController`] owns the [`SharedState`] and responds to
//! [`ControllerCommand`]s received over a `tokio::sync::mpsc` channel.
//!
//! # Cycle
//!
//! ```text
//! Analyze(request)
//!   ├─ blank error text → Failed("Please paste…"), no network call
//!   └─ cancel in-flight cycle, release playback
//!        └─▶ spawn(analyzer.analyze) + LoadingTicker      [Loading]
//!              ├─ Ok  → result                             [Succeeded]
//!              └─ Err → error message, result cleared      [Failed]
//!
//! ToggleAudio
//!   ├─ playing or synthesizing → abort synthesis, release playback
//!   └─ result → spawn(synthesizer.synthesize → spawn_blocking(sink.play))
//!
//! Reset → cancel everything                                [Idle]
//! ```
//!
//! At most one analysis and one narration exist at a time.  A newer
//! submission aborts the older task, so a stale reply can never overwrite a
//! newer cycle.  Synthesis runs as its own task, so commands keep flowing
//! while speech is being generated.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::analysis::{
    AnalysisError, AnalysisRequest, AnalysisResult, ErrorAnalyzer, ValidationError,
};
use crate::speech::{narration_script, AudioSink, Playback, PlaybackEnd, SpeechError, SpeechSynthesizer};

use super::state::{lock_state, LifecyclePhase, LifecycleState, SharedState};
use super::ticker::{LoadingTicker, DEFAULT_INTERVAL, LOADING_MESSAGES};

/// Shown when the analysis task dies without producing an outcome.
pub const GENERIC_FAILURE: &str = "Something went wrong";

type AnalysisOutcome = Result<AnalysisResult, AnalysisError>;
type NarrationOutcome = Result<Playback, SpeechError>;

// ---------------------------------------------------------------------------
// ControllerCommand
// ---------------------------------------------------------------------------

/// Requests sent from the UI to the controller.
#[derive(Debug, Clone)]
pub enum ControllerCommand {
    Analyze(AnalysisRequest),
    /// Start narration of the current result, or stop it if playing.
    ToggleAudio,
    /// Start over: cancel work and return to the empty form.
    Reset,
}

/// The analysis of the current cycle.
struct InFlight {
    task: JoinHandle<AnalysisOutcome>,
    ticker: LoadingTicker,
}

// ---------------------------------------------------------------------------
// AnalysisController
// ---------------------------------------------------------------------------

/// Owns the lifecycle of one analysis at a time.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use it_works_locally::analysis::GeminiAnalyzer;
/// use it_works_locally::config::AppConfig;
/// use it_works_locally::pipeline::{new_shared_state, AnalysisController};
/// use it_works_locally::speech::{CpalSink, ElevenLabsSynthesizer};
///
/// # async fn example() {
/// let config = AppConfig::default().with_env_overrides();
/// let controller = AnalysisController::new(
///     new_shared_state(),
///     Arc::new(GeminiAnalyzer::from_config(&config.llm)),
///     Arc::new(ElevenLabsSynthesizer::from_config(&config.tts)),
///     Arc::new(CpalSink::new()),
/// );
///
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
/// tokio::spawn(controller.run(command_rx));
/// # drop(command_tx);
/// # }
/// ```
pub struct AnalysisController {
    state: SharedState,
    analyzer: Arc<dyn ErrorAnalyzer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn AudioSink>,
    loading_interval: Duration,
    inflight: Option<InFlight>,
    /// Synthesis plus device start, until it yields a playback.
    pending_audio: Option<JoinHandle<NarrationOutcome>>,
    playback: Option<Playback>,
}

impl AnalysisController {
    pub fn new(
        state: SharedState,
        analyzer: Arc<dyn ErrorAnalyzer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        Self {
            state,
            analyzer,
            synthesizer,
            sink,
            loading_interval: DEFAULT_INTERVAL,
            inflight: None,
            pending_audio: None,
            playback: None,
        }
    }

    /// Period of the rotating loading message.
    pub fn with_loading_interval(mut self, interval: Duration) -> Self {
        self.loading_interval = interval;
        self
    }

    pub fn state(&self) -> SharedState {
        SharedState::clone(&self.state)
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `commands` is closed, then release everything.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ControllerCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                outcome = settled(&mut self.inflight), if self.inflight.is_some() => {
                    self.settle(outcome);
                }
                outcome = synthesized(&mut self.pending_audio), if self.pending_audio.is_some() => {
                    self.begin_playback(outcome);
                }
                end = playback_ended(&mut self.playback), if self.playback.is_some() => {
                    self.finish_playback(end);
                }
            }
        }

        self.shutdown();
        log::info!("controller: command channel closed, shutting down");
    }

    fn handle(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Analyze(request) => {
                if let Err(e) = self.submit(request) {
                    log::info!("controller: submission rejected: {e}");
                }
            }
            ControllerCommand::ToggleAudio => self.toggle_audio(),
            ControllerCommand::Reset => self.reset(),
        }
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    /// Validate `request` and start a new cycle for it.
    ///
    /// Any in-flight analysis is cancelled and any playback released.  A
    /// blank submission is rejected with no network call; while another
    /// analysis is loading it is ignored without touching the state.
    pub fn submit(&mut self, request: AnalysisRequest) -> Result<(), ValidationError> {
        if let Err(e) = request.validate() {
            if self.inflight.is_none() {
                self.stop_playback();
                let mut st = lock_state(&self.state);
                st.phase = LifecyclePhase::Failed;
                st.error = Some(e.to_string());
                st.result = None;
            }
            return Err(e);
        }

        self.cancel_inflight();
        self.stop_playback();

        let cycle = {
            let mut st = lock_state(&self.state);
            st.cycle += 1;
            st.phase = LifecyclePhase::Loading;
            st.result = None;
            st.error = None;
            st.cycle
        };
        log::info!(
            "controller: analyzing {} chars as {} (cycle {cycle})",
            request.error_text.len(),
            request.expertise.label()
        );

        let ticker = LoadingTicker::start(
            self.state(),
            cycle,
            LOADING_MESSAGES,
            self.loading_interval,
        );
        let analyzer = Arc::clone(&self.analyzer);
        let task = tokio::spawn(async move { analyzer.analyze(&request).await });

        self.inflight = Some(InFlight { task, ticker });
        Ok(())
    }

    /// Wait for the in-flight analysis, if any, and apply its outcome.
    pub async fn settle_pending(&mut self) {
        let Some(inflight) = self.inflight.as_mut() else {
            return;
        };
        let outcome = (&mut inflight.task).await;
        self.settle(outcome);
    }

    fn settle(&mut self, outcome: Result<AnalysisOutcome, JoinError>) {
        let Some(inflight) = self.inflight.take() else {
            return;
        };
        inflight.ticker.stop();

        let mut st = lock_state(&self.state);
        match outcome {
            Ok(Ok(result)) => {
                log::info!(
                    "controller: analysis ready ({} fix steps)",
                    result.fix_steps.len()
                );
                st.phase = LifecyclePhase::Succeeded;
                st.result = Some(result);
                st.error = None;
            }
            Ok(Err(e)) => {
                log::error!("controller: analysis failed: {e}");
                fail(&mut st, e.to_string());
            }
            Err(e) => {
                log::error!("controller: analysis task failed: {e}");
                fail(&mut st, GENERIC_FAILURE.to_string());
            }
        }
    }

    fn cancel_inflight(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            log::debug!("controller: cancelling in-flight analysis");
            inflight.task.abort();
            inflight.ticker.stop();
        }
    }

    // -----------------------------------------------------------------------
    // Narration
    // -----------------------------------------------------------------------

    /// Stop narration if it is playing or being synthesized, otherwise
    /// start it.
    pub fn toggle_audio(&mut self) {
        let busy = self.playback.is_some()
            || self.pending_audio.is_some()
            || lock_state(&self.state).is_playing;
        if busy {
            self.stop_playback();
        } else {
            self.start_playback();
        }
    }

    /// Spawn synthesis and playback of the current result.
    ///
    /// Any previous narration is released first.  Failures are reported in
    /// `error` and leave the result untouched.
    pub fn start_playback(&mut self) {
        self.stop_playback();

        let result = {
            let mut st = lock_state(&self.state);
            let Some(result) = st.result.clone() else {
                log::debug!("controller: nothing to narrate");
                return;
            };
            st.is_playing = true;
            st.error = None;
            result
        };

        let script = narration_script(&result);
        let synthesizer = Arc::clone(&self.synthesizer);
        let sink = Arc::clone(&self.sink);
        self.pending_audio = Some(tokio::spawn(narrate(synthesizer, sink, script)));
    }

    /// Wait for pending synthesis, if any, and start its playback.
    pub async fn settle_synthesis(&mut self) {
        let Some(pending) = self.pending_audio.as_mut() else {
            return;
        };
        let outcome = pending.await;
        self.begin_playback(outcome);
    }

    fn begin_playback(&mut self, outcome: Result<NarrationOutcome, JoinError>) {
        self.pending_audio = None;

        let message = match outcome {
            Ok(Ok(playback)) => {
                log::info!("controller: narration started");
                self.playback = Some(playback);
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) if e.is_cancelled() => return,
            Err(e) => SpeechError::Playback(e.to_string()).to_string(),
        };

        log::error!("controller: narration failed: {message}");
        let mut st = lock_state(&self.state);
        st.is_playing = false;
        st.error = Some(message);
    }

    /// Abort pending synthesis and release the active playback, if any.
    pub fn stop_playback(&mut self) {
        if let Some(pending) = self.pending_audio.take() {
            log::debug!("controller: cancelling pending synthesis");
            pending.abort();
        }
        if let Some(mut playback) = self.playback.take() {
            log::debug!("controller: releasing playback");
            playback.release();
        }
        lock_state(&self.state).is_playing = false;
    }

    /// Wait for the active playback, if any, to end on its own.
    pub async fn settle_playback(&mut self) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let end = playback.ended().await;
        self.finish_playback(end);
    }

    fn finish_playback(&mut self, end: PlaybackEnd) {
        log::debug!("controller: playback ended ({end:?})");
        if let Some(mut playback) = self.playback.take() {
            playback.release();
        }

        let mut st = lock_state(&self.state);
        st.is_playing = false;
        if let PlaybackEnd::Failed(msg) = end {
            st.error = Some(SpeechError::Playback(msg).to_string());
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Start over with an empty form.
    pub fn reset(&mut self) {
        log::info!("controller: reset");
        self.cancel_inflight();
        self.stop_playback();

        let mut st = lock_state(&self.state);
        let cycle = st.cycle + 1;
        *st = LifecycleState {
            cycle,
            ..LifecycleState::default()
        };
    }

    /// Cancel the in-flight analysis and release narration.  Idempotent.
    ///
    /// An interrupted cycle ends in `Idle` so nothing is left loading.
    pub fn shutdown(&mut self) {
        self.cancel_inflight();
        if self.playback.is_some() || self.pending_audio.is_some() {
            self.stop_playback();
        }

        let mut st = lock_state(&self.state);
        if st.is_loading() {
            st.phase = LifecyclePhase::Idle;
            st.cycle += 1;
            st.loading_message.clear();
        }
    }
}

impl Drop for AnalysisController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Synthesize `script` and start it on the sink.
async fn narrate(
    synthesizer: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn AudioSink>,
    script: String,
) -> NarrationOutcome {
    let audio = synthesizer.synthesize(&script).await?;
    log::debug!(
        "controller: synthesized {:.1}s of speech",
        audio.duration_secs()
    );

    tokio::task::spawn_blocking(move || sink.play(audio))
        .await
        .map_err(|e| SpeechError::Playback(e.to_string()))?
}

fn fail(st: &mut LifecycleState, message: String) {
    st.phase = LifecyclePhase::Failed;
    st.result = None;
    st.error = Some(message);
}

async fn settled(inflight: &mut Option<InFlight>) -> Result<AnalysisOutcome, JoinError> {
    match inflight {
        Some(inflight) => (&mut inflight.task).await,
        None => std::future::pending().await,
    }
}

async fn synthesized(
    pending: &mut Option<JoinHandle<NarrationOutcome>>,
) -> Result<NarrationOutcome, JoinError> {
    match pending {
        Some(pending) => pending.await,
        None => std::future::pending().await,
    }
}

async fn playback_ended(playback: &mut Option<Playback>) -> PlaybackEnd {
    match playback {
        Some(playback) => playback.ended().await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
