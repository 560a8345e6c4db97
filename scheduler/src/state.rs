//! Run-level state shared between the trigger and the scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Prevents two detection runs from overlapping.
///
/// Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

/// Held for the lifetime of a run; releases the guard on drop.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while another run holds the guard.
    pub fn try_begin(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_run_is_refused_while_first_holds_permit() {
        let guard = RunGuard::new();

        let permit = guard.try_begin().expect("first run");
        assert!(guard.is_running());
        assert!(guard.try_begin().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_begin().is_some());
    }

    #[test]
    fn clones_share_the_flag() {
        let guard = RunGuard::new();
        let other = guard.clone();

        let _permit = guard.try_begin().expect("first run");
        assert!(other.try_begin().is_none());
    }
}
