//! Rotating loading messages.
//!
//! Purely cosmetic: the ticker has no influence on the analysis request.  It
//! is owned by the controller for exactly one cycle and must be stopped on
//! every exit path; dropping it aborts the background task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::state::{lock_state, SharedState};

pub const LOADING_MESSAGES: &[&str] = &[
    "Asking Stack Overflow...",
    "Blaming the intern...",
    "Checking if you tried turning it off and on...",
    "Consulting the rubber duck...",
    "Reading the docs (just kidding)...",
    "Checking if it's a DNS issue...",
    "It's always DNS...",
    "Praying to the demo gods...",
    "Running rm -rf node_modules...",
    "Mass git blame-ing everyone...",
    "Wondering if we should mass rewrite in Rust...",
];

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2_000);

/// Background task advancing `loading_message` on a fixed interval.
#[derive(Debug)]
pub struct LoadingTicker {
    task: Option<JoinHandle<()>>,
    state: SharedState,
    cycle: u64,
}

impl LoadingTicker {
    /// Show the first message immediately and rotate through `messages`
    /// every `period`, wrapping around.  Writes only while `cycle` is the
    /// state's current, still-loading cycle.
    pub fn start(
        state: SharedState,
        cycle: u64,
        messages: &'static [&'static str],
        period: Duration,
    ) -> Self {
        let Some(first) = messages.first() else {
            return Self {
                task: None,
                state,
                cycle,
            };
        };
        lock_state(&state).loading_message = (*first).to_string();

        let shared = SharedState::clone(&state);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            let mut index = 0usize;
            loop {
                interval.tick().await;
                index = (index + 1) % messages.len();

                let mut st = lock_state(&shared);
                if st.cycle != cycle || !st.is_loading() {
                    break;
                }
                st.loading_message = messages[index].to_string();
            }
        });

        Self {
            task: Some(task),
            state,
            cycle,
        }
    }

    /// Abort the task and clear the message (if it is still this cycle's).
    pub fn stop(mut self) {
        self.abort();
        let mut st = lock_state(&self.state);
        if st.cycle == self.cycle {
            st.loading_message.clear();
        }
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for LoadingTicker {
    fn drop(&mut self) {
        self.abort();
    }
}
