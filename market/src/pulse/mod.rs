//! Signals computed from fetched market data.

pub mod volume_spike;

pub use volume_spike::{SpikeConfig, SpikeDetector, SpikeEvent, SpikeOutcome};
