use chrono::{DateTime, NaiveDate, Utc};

/// A tradable contract as listed by the market API.
///
/// `full_symbol` is the API-assigned identifier and is unique per contract;
/// `base_label` is a human-readable label derived from the listing; it is
/// carried into the spike log line and never used as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instrument {
    pub full_symbol: String,
    pub base_label: String,
}

impl Instrument {
    pub fn new(full_symbol: impl Into<String>, base_label: impl Into<String>) -> Self {
        Self {
            full_symbol: full_symbol.into(),
            base_label: base_label.into(),
        }
    }
}

/// Half-open `[from, to)` UTC range used for kline queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn from_ms(&self) -> i64 {
        self.from.timestamp_millis()
    }

    pub fn to_ms(&self) -> i64 {
        self.to.timestamp_millis()
    }

    pub fn contains_ms(&self, ts_ms: i64) -> bool {
        self.from_ms() <= ts_ms && ts_ms < self.to_ms()
    }
}

/// One daily bar, reduced to the two fields the detector cares about.
///
/// `volume` is `None` when the API returned something that is not a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kline {
    pub ts_ms: i64,
    pub volume: Option<f64>,
}

impl Kline {
    /// Volume if it is a finite, strictly positive number.
    pub fn valid_volume(&self) -> Option<f64> {
        self.volume.filter(|v| v.is_finite() && *v > 0.0)
    }

    /// Converts the bar into a dated sample, dropping invalid volumes.
    pub fn to_sample(&self) -> Option<DailyVolumeSample> {
        let volume = self.valid_volume()?;
        let date = DateTime::<Utc>::from_timestamp_millis(self.ts_ms)?.date_naive();
        Some(DailyVolumeSample { date, volume })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyVolumeSample {
    pub date: NaiveDate,
    pub volume: f64,
}

impl DailyVolumeSample {
    pub fn is_valid(&self) -> bool {
        self.volume.is_finite() && self.volume > 0.0
    }
}

/// Daily volume samples for one instrument, in fetch-window order.
///
/// Only valid samples are kept. Samples sharing a date are not merged: the
/// detector only looks at the maximum, so duplicates are harmless.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeHistory {
    samples: Vec<DailyVolumeSample>,
}

impl VolumeHistory {
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = DailyVolumeSample>,
    {
        Self {
            samples: samples.into_iter().filter(|s| s.is_valid()).collect(),
        }
    }

    pub fn samples(&self) -> &[DailyVolumeSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest sample. On ties the first one in sequence order wins, which
    /// follows fetch-window order and carries no business meaning.
    pub fn max_sample(&self) -> Option<&DailyVolumeSample> {
        self.samples.iter().fold(None, |best, s| match best {
            Some(b) if b.volume >= s.volume => Some(b),
            _ => Some(s),
        })
    }
}
