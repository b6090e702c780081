use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

// ============================================================================
// Samples
// ============================================================================

/// One hourly observation of building consumption and its context.
///
/// Samples are produced by the ingestion layer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<FixedOffset>,
    pub consumption_kwh: f64,
    pub temperature_c: f64,
    pub irradiance_wm2: f64,
    pub wind_speed_ms: f64,
    /// Share of nominal occupancy (0.0 - 1.0)
    pub occupancy_fraction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_generation_kwh: Option<f64>,
}

impl Sample {
    /// Hour of the day (0-23) in the sample's own offset
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Day of the week (0=Monday, 6=Sunday)
    pub fn day_of_week(&self) -> u32 {
        self.timestamp.weekday().num_days_from_monday()
    }

    pub fn is_weekend(&self) -> bool {
        self.day_of_week() >= 5
    }

    /// Weekday between 08:00 and 18:00
    pub fn is_business_hours(&self) -> bool {
        !self.is_weekend() && (8..18).contains(&self.hour())
    }

    /// True when every numeric reading needed by the engines is usable
    pub fn is_complete(&self) -> bool {
        self.consumption_kwh.is_finite()
            && self.consumption_kwh >= 0.0
            && self.temperature_c.is_finite()
            && self.irradiance_wm2.is_finite()
    }
}

// ============================================================================
// Retention window
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum HistoryError {
    #[error("Sample at {incoming} is not after the newest retained sample at {newest}")]
    OutOfOrder {
        newest: DateTime<FixedOffset>,
        incoming: DateTime<FixedOffset>,
    },
    #[error("Retention capacity must be positive")]
    ZeroCapacity,
}

/// Caller-bounded, timestamp-ordered window of samples.
///
/// Oldest samples are evicted once `capacity` is exceeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredHistory")]
pub struct SampleHistory {
    samples: Vec<Sample>,
    capacity: usize,
}

/// Serialized form; replayed through [`SampleHistory::push`] on load
#[derive(Deserialize)]
struct StoredHistory {
    samples: Vec<Sample>,
    capacity: usize,
}

impl TryFrom<StoredHistory> for SampleHistory {
    type Error = HistoryError;

    fn try_from(stored: StoredHistory) -> Result<Self, Self::Error> {
        let mut history = SampleHistory::new(stored.capacity)?;
        history.extend(stored.samples)?;
        Ok(history)
    }
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }
        Ok(Self {
            samples: Vec::new(),
            capacity,
        })
    }

    /// Append a sample, evicting the oldest entries if the window is full
    pub fn push(&mut self, sample: Sample) -> Result<(), HistoryError> {
        if let Some(newest) = self.samples.last() {
            if sample.timestamp <= newest.timestamp {
                return Err(HistoryError::OutOfOrder {
                    newest: newest.timestamp,
                    incoming: sample.timestamp,
                });
            }
        }

        self.samples.push(sample);

        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(0..excess);
        }
        Ok(())
    }

    /// Push every sample in order, stopping at the first rejected one
    pub fn extend<I>(&mut self, samples: I) -> Result<(), HistoryError>
    where
        I: IntoIterator<Item = Sample>,
    {
        for sample in samples {
            self.push(sample)?;
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Check that timestamps strictly increase across a caller-supplied slice
pub fn ensure_ordered(samples: &[Sample]) -> Result<(), HistoryError> {
    match samples
        .iter()
        .tuple_windows()
        .find(|(prev, next)| next.timestamp <= prev.timestamp)
    {
        Some((prev, next)) => Err(HistoryError::OutOfOrder {
            newest: prev.timestamp,
            incoming: next.timestamp,
        }),
        None => Ok(()),
    }
}

// ============================================================================
// Tariff
// ============================================================================

/// Time-of-use pricing window
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TouPeriod {
    Peak,
    MidPeak,
    OffPeak,
}
