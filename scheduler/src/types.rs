use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 22;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 2;
pub const DEFAULT_BATCH_PACING: Duration = Duration::from_secs(10);

/// Batching and pacing knobs for one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Instruments per batch.
    pub batch_size: usize,
    /// Instruments evaluated at the same time within a batch.
    pub concurrency: usize,
    /// Sleep between two batches. Not applied after the last one.
    pub batch_pacing: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            batch_pacing: DEFAULT_BATCH_PACING,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerConfigError {
    #[error("batch size must be positive")]
    EmptyBatch,

    #[error("batch concurrency must be positive")]
    NoConcurrency,

    #[error("batch concurrency ({concurrency}) must be below batch size ({batch_size})")]
    ConcurrencyTooHigh { concurrency: usize, batch_size: usize },
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), SchedulerConfigError> {
        if self.batch_size == 0 {
            return Err(SchedulerConfigError::EmptyBatch);
        }
        if self.concurrency == 0 {
            return Err(SchedulerConfigError::NoConcurrency);
        }
        if self.concurrency >= self.batch_size {
            return Err(SchedulerConfigError::ConcurrencyTooHigh {
                concurrency: self.concurrency,
                batch_size: self.batch_size,
            });
        }
        Ok(())
    }
}
