//! Process-wide pause gate.
//!
//! Every outbound call awaits the gate before dispatching. A rate-limit
//! response closes the gate until a deadline; all tasks, including those
//! already waiting, observe the same deadline.
//!
//! While a pause is in force further rate-limit signals join it instead of
//! extending it, so a burst of concurrent 429s costs one cooldown window.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep_until};

/// Outcome of [`PauseGate::pause_for`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pause {
    /// When outbound calls may resume.
    pub until: Instant,
    /// `true` if this call opened the window, `false` if it joined one.
    pub opened: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PauseGate {
    deadline: Arc<Mutex<Option<Instant>>>,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once no pause is in force. A no-op when the gate is idle.
    pub async fn wait(&self) {
        while let Some(deadline) = self.active_deadline() {
            sleep_until(deadline).await;
        }
    }

    /// Closes the gate for `cooldown` from now, unless it is already closed.
    pub fn pause_for(&self, cooldown: Duration) -> Pause {
        let now = Instant::now();
        let mut guard = self.deadline.lock();

        match *guard {
            Some(until) if until > now => Pause {
                until,
                opened: false,
            },
            _ => {
                let until = now + cooldown;
                *guard = Some(until);
                Pause { until, opened: true }
            }
        }
    }

    /// The deadline currently in force, if any. Expired deadlines are
    /// cleared so the gate returns to idle.
    pub fn active_deadline(&self) -> Option<Instant> {
        let mut guard = self.deadline.lock();
        match *guard {
            Some(until) if until > Instant::now() => Some(until),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.active_deadline().is_some()
    }
}
