//! Daily trigger.
//!
//! Sleeps until the next configured UTC wall-clock time, starts a run in the
//! background and goes back to sleep. A run that is still going when the
//! next trigger fires makes that trigger a no-op (see `RunGuard`).

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tracing::info;

use common::time::next_daily_run;

#[derive(Debug, Clone, Copy)]
pub struct DailyTrigger {
    at: NaiveTime,
}

impl DailyTrigger {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// Next firing strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        next_daily_run(after, self.at)
    }

    /// Loops forever, spawning `job(scheduled_for)` at every firing.
    ///
    /// `job` is spawned, not awaited: a long run never delays the schedule.
    /// The next firing is computed from the later of the previous firing and
    /// the clock, so an early timer wake-up cannot fire the same slot twice.
    pub async fn run<F, Fut>(self, job: F)
    where
        F: Fn(DateTime<Utc>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.run_with_clock(job, Utc::now).await
    }

    /// [`run`](Self::run) with the wall clock supplied by the caller.
    pub async fn run_with_clock<F, Fut, C>(self, job: F, clock: C)
    where
        F: Fn(DateTime<Utc>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
        C: Fn() -> DateTime<Utc>,
    {
        let mut last = clock();

        loop {
            let next = self.next_after(last);
            let wait = delay_until(clock(), next);
            info!(next_run = %next, wait_s = wait.as_secs(), "waiting for daily trigger");

            tokio::time::sleep(wait).await;

            info!(scheduled_for = %next, "daily trigger fired");
            tokio::spawn(job(next));
            last = next.max(clock());
        }
    }
}

/// Time left until `target`, zero when it is already due.
pub fn delay_until(now: DateTime<Utc>, target: DateTime<Utc>) -> Duration {
    (target - now)
        .max(TimeDelta::zero())
        .to_std()
        .unwrap_or(Duration::ZERO)
}
