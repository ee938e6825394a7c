//! Lifecycle state machine and shared state.
//!
//! [`LifecyclePhase`] drives the controller's state machine.  The UI reads
//! it via [`SharedState`] to pick the view to render.
//!
//! [`LifecycleState`] is the single source of truth for everything the UI
//! needs: phase, rotating loading message, current result or error, and
//! whether narration is playing.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<LifecycleState>>`, cheap
//! to clone and safe to share across threads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::analysis::AnalysisResult;

// ---------------------------------------------------------------------------
// LifecyclePhase
// ---------------------------------------------------------------------------

/// Phases of one analysis cycle.
///
/// ```text
/// Idle ──submit──▶ Loading ──ok──▶ Succeeded
///                          ──err─▶ Failed
/// Succeeded / Failed ──submit──▶ Loading
/// any ──reset──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    /// Nothing submitted yet, or the user started over.
    #[default]
    Idle,
    /// The analysis request is in flight.
    Loading,
    /// A result is available.
    Succeeded,
    /// The last submission failed; `error` holds the message.
    Failed,
}

impl LifecyclePhase {
    /// ```
    /// use it_works_locally::pipeline::LifecyclePhase;
    ///
    /// assert!(LifecyclePhase::Loading.is_busy());
    /// assert!(!LifecyclePhase::Succeeded.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, LifecyclePhase::Loading)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecyclePhase::Idle => "Idle",
            LifecyclePhase::Loading => "Analyzing",
            LifecyclePhase::Succeeded => "Done",
            LifecyclePhase::Failed => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleState
// ---------------------------------------------------------------------------

/// Shared lifecycle state, mutated by the controller and read by the UI.
#[derive(Debug, Clone, Default)]
pub struct LifecycleState {
    pub phase: LifecyclePhase,

    /// Cosmetic progress text while loading; empty otherwise.
    pub loading_message: String,

    pub result: Option<AnalysisResult>,

    pub error: Option<String>,

    /// Narration is being synthesized or played.
    pub is_playing: bool,

    /// Incremented on every submission and reset.  Background writers
    /// (the loading ticker) only touch the state of their own cycle.
    pub cycle: u64,
}

impl LifecycleState {
    pub fn is_loading(&self) -> bool {
        self.phase.is_busy()
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`LifecycleState`].
///
/// Lock for a short critical section only; never hold the guard across an
/// `.await`.
pub type SharedState = Arc<Mutex<LifecycleState>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(LifecycleState::default()))
}

/// Lock `state`, recovering the data if a previous holder panicked.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, LifecycleState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
