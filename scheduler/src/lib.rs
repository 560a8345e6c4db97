pub mod counters;
pub mod engine;
pub mod policy;
pub mod state;
pub mod types;

pub use counters::RunSummary;
pub use engine::BatchScheduler;
pub use state::{RunGuard, RunPermit};
pub use types::{SchedulerConfig, SchedulerConfigError};
