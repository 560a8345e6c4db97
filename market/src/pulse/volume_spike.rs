//! Volume Spike Pulse
//!
//! Flags an instrument whose traded volume over the last complete UTC day is
//! far above anything it traded during the lookback period.
//!
//! ## Rule
//! ```text
//! spike  <=>  current_volume > spike_ratio * historical_max
//! ```
//! The inequality is strict: exactly `spike_ratio` times the maximum is not a
//! spike.
//!
//! ## Data guard
//! Newly listed instruments have little or no history. The pulse only decides
//! once the history holds at least `min_samples` valid samples and a current
//! volume is known; otherwise it reports `InsufficientData`. That is an
//! expected outcome, not an error.
//!
//! ## Ties
//! Only the maximum value feeds the decision. When several days share it,
//! the first one in fetch order supplies the display date, which is
//! effectively arbitrary.
//!
//! ## Determinism
//! Pure function of its inputs. I/O lives in the fetchers and the scheduler.

use chrono::NaiveDate;

use crate::types::{Instrument, VolumeHistory};

pub const DEFAULT_SPIKE_RATIO: f64 = 2.0;
pub const DEFAULT_MIN_SAMPLES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeConfig {
    /// Multiplier the current volume must strictly exceed.
    pub ratio: f64,
    /// Minimum number of valid history samples before deciding.
    pub min_samples: usize,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_SPIKE_RATIO,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// A detected spike. Lives only long enough to be rendered and sent.
#[derive(Clone, Debug, PartialEq)]
pub struct SpikeEvent {
    pub instrument: Instrument,
    pub current_volume: f64,
    pub historical_max: f64,
    pub historical_max_date: NaiveDate,
    /// `current_volume / historical_max`, unrounded.
    pub ratio: f64,
    /// `ratio` rounded to two decimals for display.
    pub ratio_rounded: f64,
    /// Calendar day the spike was detected on.
    pub detected_on: NaiveDate,
}

impl SpikeEvent {
    pub fn ratio_display(&self) -> String {
        format!("{:.2}", self.ratio_rounded)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SpikeOutcome {
    Spike(SpikeEvent),
    Quiet { current_volume: f64, historical_max: f64 },
    InsufficientData { samples: usize, has_current: bool },
}

impl SpikeOutcome {
    pub fn spike(&self) -> Option<&SpikeEvent> {
        match self {
            Self::Spike(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SpikeDetector {
    cfg: SpikeConfig,
}

impl SpikeDetector {
    pub fn new(cfg: SpikeConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> SpikeConfig {
        self.cfg
    }

    /// Compares `current_volume` against the maximum of `history`.
    pub fn evaluate(
        &self,
        instrument: &Instrument,
        history: Option<&VolumeHistory>,
        current_volume: Option<f64>,
        today: NaiveDate,
    ) -> SpikeOutcome {
        let samples = history.map_or(0, VolumeHistory::len);

        let (Some(history), Some(current_volume)) = (history, current_volume) else {
            return SpikeOutcome::InsufficientData {
                samples,
                has_current: current_volume.is_some(),
            };
        };

        if samples < self.cfg.min_samples {
            return SpikeOutcome::InsufficientData {
                samples,
                has_current: true,
            };
        }

        // Non-empty: min_samples guard above, and history only holds valid samples.
        let Some(max) = history.max_sample() else {
            return SpikeOutcome::InsufficientData {
                samples,
                has_current: true,
            };
        };

        if current_volume > self.cfg.ratio * max.volume {
            let ratio = current_volume / max.volume;
            SpikeOutcome::Spike(SpikeEvent {
                instrument: instrument.clone(),
                current_volume,
                historical_max: max.volume,
                historical_max_date: max.date,
                ratio,
                ratio_rounded: round_to_cents(ratio),
                detected_on: today,
            })
        } else {
            SpikeOutcome::Quiet {
                current_volume,
                historical_max: max.volume,
            }
        }
    }
}

/// Rounds to two decimal places, half away from zero.
pub fn round_to_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
