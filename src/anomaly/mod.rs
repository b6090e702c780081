//! Consumption anomaly detection.
//!
//! Every sample past the warm-up index is scored by four independent
//! sub-detectors (see [`detectors`]) and their outcomes are fused into a single
//! [`AnomalyRecord`]. The (day, hour) baseline is rebuilt from the supplied
//! history on every call, so results depend only on the input.

pub mod baseline;
pub mod detectors;
pub mod fusion;

pub use baseline::*;
pub use detectors::{DetectorKind, DetectorOutcome, Finding, ScoringContext};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;
use validator::Validate;

use crate::domain::{AnomalyRecord, AnomalySummary, Sample};
use crate::forecast::features::tail;

/// Samples skipped at the start of the history regardless of window size
pub const MIN_WARMUP: usize = 24;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

/// Z-score thresholds for the statistical detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZCutoffs {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Sensitivity {
    pub fn z_cutoffs(self) -> ZCutoffs {
        let (high, medium, low) = match self {
            Sensitivity::Low => (4.0, 3.5, 3.0),
            Sensitivity::Medium => (3.5, 3.0, 2.5),
            Sensitivity::High => (3.0, 2.5, 2.0),
        };
        ZCutoffs { high, medium, low }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnomalyConfig {
    pub sensitivity: Sensitivity,

    /// Trailing samples used by the statistical and contextual detectors
    #[validate(range(min = 1))]
    pub window_size: usize,

    /// Trailing samples used by the equipment detector
    #[validate(range(min = 3))]
    pub equipment_window: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            window_size: 48,
            equipment_window: 6,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Score every sample using the configured window size
    pub fn detect(&self, history: &[Sample]) -> Vec<AnomalyRecord> {
        self.detect_with_window(history, self.config.window_size)
    }

    /// Score every sample from index `max(window_size, 24)` onwards
    pub fn detect_with_window(&self, history: &[Sample], window_size: usize) -> Vec<AnomalyRecord> {
        let window_size = window_size.max(1);
        let start = window_size.max(MIN_WARMUP);
        if history.len() <= start {
            debug!(
                samples = history.len(),
                start, "history too short for anomaly detection"
            );
            return Vec::new();
        }

        let baseline = build_baseline(history);
        let records: Vec<AnomalyRecord> = (start..history.len())
            .map(|i| {
                let current = &history[i];
                let ctx = ScoringContext {
                    current,
                    window: &history[i - window_size..i],
                    recent: tail(&history[..i], self.config.equipment_window),
                    baseline: &baseline,
                    sensitivity: self.config.sensitivity,
                };
                fusion::fuse(current.timestamp, current.consumption_kwh, &ctx.evaluate_all())
            })
            .collect();

        debug!(
            evaluated = records.len(),
            flagged = records.iter().filter(|r| r.is_anomaly).count(),
            sensitivity = %self.config.sensitivity,
            "anomaly detection complete"
        );
        records
    }

    pub fn summarize(records: &[AnomalyRecord]) -> AnomalySummary {
        AnomalySummary::from_records(records)
    }
}
