//! The batch scheduler.
//!
//! One call to [`BatchScheduler::run`] is one detection run:
//!   1. Fetches the active instrument list (once per run).
//!   2. Splits it into sorted batches via `policy`.
//!   3. Runs batches one after the other, at most `concurrency` instruments
//!      in flight inside a batch, sleeping `batch_pacing` between batches.
//!   4. For every instrument, fetches history and the current window
//!      concurrently, runs the spike detector and notifies on a spike.
//!
//! A failing instrument never stops the run. Overlapping runs are refused
//! through the shared [`RunGuard`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument as _, Span, debug, error, info, warn};

use common::logger::{TraceId, child_span, root_span, warn_if_slow};
use common::time::utc_day_start;
use market::pulse::{SpikeDetector, SpikeOutcome};
use market::types::Instrument;
use market::{CurrentWindowFetcher, HistoryFetcher, LookbackConfig, MarketApi, RateLimitedClient};
use notifier::{Notifier, deliver, render_spike};

use crate::counters::{RunCounters, RunSummary};
use crate::policy::plan_batches;
use crate::state::RunGuard;
use crate::types::SchedulerConfig;

const SLOW_LISTING: Duration = Duration::from_secs(30);
const SLOW_EVALUATION: Duration = Duration::from_secs(90);

pub struct BatchScheduler<A, N> {
    cfg: SchedulerConfig,
    client: Arc<RateLimitedClient<A>>,
    evaluator: Arc<Evaluator<A, N>>,
    guard: RunGuard,
}

/// Everything a single instrument task needs. Shared by all tasks of a run.
struct Evaluator<A, N> {
    history: HistoryFetcher<A>,
    current: CurrentWindowFetcher<A>,
    detector: SpikeDetector,
    notifier: Arc<N>,
}

impl<A: MarketApi, N: Notifier> BatchScheduler<A, N> {
    pub fn new(
        cfg: SchedulerConfig,
        client: Arc<RateLimitedClient<A>>,
        lookback: LookbackConfig,
        detector: SpikeDetector,
        notifier: Arc<N>,
    ) -> Self {
        let evaluator = Evaluator {
            history: HistoryFetcher::new(Arc::clone(&client), lookback),
            current: CurrentWindowFetcher::new(Arc::clone(&client)),
            detector,
            notifier,
        };

        Self {
            cfg,
            client,
            evaluator: Arc::new(evaluator),
            guard: RunGuard::new(),
        }
    }

    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// Runs a detection pass for the current UTC day.
    ///
    /// Returns `None` when another run is still in progress.
    pub async fn run(&self) -> Option<RunSummary> {
        self.run_at(Utc::now()).await
    }

    /// Same as [`run`](Self::run) with an explicit clock reading. The UTC day
    /// is derived once from `now` and used by every instrument of the run.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Option<RunSummary> {
        let Some(_permit) = self.guard.try_begin() else {
            warn!("previous volume check still running; skipping this trigger");
            return None;
        };

        let trace_id = TraceId::new();
        let span = root_span("volume_check", &trace_id);

        Some(self.run_inner(now).instrument(span).await)
    }

    async fn run_inner(&self, now: DateTime<Utc>) -> RunSummary {
        let rate_limited_before = self.client.stats().rate_limited();
        let day_start = utc_day_start(now);
        let today = day_start.date_naive();

        let listing = warn_if_slow(
            "active instruments",
            SLOW_LISTING,
            self.client.active_instruments(),
        )
        .await;

        let instruments = listing.unwrap_or_else(|| {
            error!("instrument list unavailable; nothing to check this run");
            Vec::new()
        });

        let batches = plan_batches(instruments, self.cfg.batch_size);
        let total: usize = batches.iter().map(Vec::len).sum();
        let batch_count = batches.len();

        Span::current().record("instruments", total);
        info!(instruments = total, batches = batch_count, %today, "checking instruments");

        let counters = RunCounters::default();

        for (idx, batch) in batches.into_iter().enumerate() {
            debug!(batch = idx + 1, size = batch.len(), "starting batch");
            self.run_batch(batch, day_start, today, &counters).await;

            if idx + 1 < batch_count {
                info!(
                    pacing_ms = self.cfg.batch_pacing.as_millis() as u64,
                    "sleeping before next batch"
                );
                tokio::time::sleep(self.cfg.batch_pacing).await;
            }
        }

        let rate_limited = self
            .client
            .stats()
            .rate_limited()
            .saturating_sub(rate_limited_before);
        let summary = counters.snapshot(total, batch_count, rate_limited);

        info!(
            instruments = summary.instruments,
            spikes = summary.spikes,
            quiet = summary.quiet,
            insufficient = summary.insufficient,
            failed_tasks = summary.failed_tasks,
            rate_limited = summary.rate_limited,
            "volume check complete"
        );

        summary
    }

    /// Evaluates one batch with bounded concurrency and waits for all of it.
    async fn run_batch(
        &self,
        batch: Vec<Instrument>,
        day_start: DateTime<Utc>,
        today: NaiveDate,
        counters: &RunCounters,
    ) {
        let sem = Arc::new(Semaphore::new(self.cfg.concurrency.max(1)));
        let mut set = JoinSet::new();

        for instrument in batch {
            // The semaphore is local and never closed.
            let Ok(permit) = Arc::clone(&sem).acquire_owned().await else {
                break;
            };

            let evaluator = Arc::clone(&self.evaluator);
            let counters = counters.clone();
            let span = child_span("evaluate", &instrument.full_symbol);

            set.spawn(
                async move {
                    let _permit = permit;
                    warn_if_slow(
                        "instrument evaluation",
                        SLOW_EVALUATION,
                        evaluator.evaluate(&instrument, day_start, today, &counters),
                    )
                    .await;
                }
                .instrument(span),
            );
        }

        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                RunCounters::bump(&counters.failed_tasks);
                error!(error = %e, "instrument task failed");
            }
        }
    }
}

impl<A: MarketApi, N: Notifier> Evaluator<A, N> {
    async fn evaluate(
        &self,
        instrument: &Instrument,
        day_start: DateTime<Utc>,
        today: NaiveDate,
        counters: &RunCounters,
    ) {
        RunCounters::bump(&counters.evaluated);

        let (history, current) = tokio::join!(
            self.history.fetch(instrument, day_start),
            self.current.fetch(instrument, day_start),
        );

        match self
            .detector
            .evaluate(instrument, history.as_ref(), current, today)
        {
            SpikeOutcome::Spike(event) => {
                RunCounters::bump(&counters.spikes);
                info!(
                    base = %event.instrument.base_label,
                    current_volume = event.current_volume,
                    historical_max = event.historical_max,
                    historical_max_date = %event.historical_max_date,
                    ratio = %event.ratio_display(),
                    "volume spike detected"
                );

                let notification = render_spike(&event);
                if !deliver(self.notifier.as_ref(), &notification).await {
                    RunCounters::bump(&counters.notify_failures);
                }
            }
            SpikeOutcome::Quiet {
                current_volume,
                historical_max,
            } => {
                RunCounters::bump(&counters.quiet);
                debug!(current_volume, historical_max, "no spike");
            }
            SpikeOutcome::InsufficientData {
                samples,
                has_current,
            } => {
                RunCounters::bump(&counters.insufficient);
                debug!(samples, has_current, "not enough data to decide");
            }
        }
    }
}
