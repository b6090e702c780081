//! The four independent sub-detectors.
//!
//! Each one either abstains (`None`) or returns a [`Finding`]. They are always
//! evaluated in [`EVALUATION_ORDER`], which is also the tie-break order used by
//! fusion.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::baseline::Baseline;
use super::Sensitivity;
use crate::domain::{AnomalyType, Sample, Severity};
use crate::forecast::features::{consumption, mean, quantile, std_dev};

const STD_EPSILON: f64 = 0.001;
const MIN_NEIGHBOURS: usize = 3;

const PATTERN_HIGH: f64 = 0.5;
const PATTERN_MEDIUM: f64 = 0.3;
const PATTERN_LOW: f64 = 0.2;

const CONTEXT_TEMP_TOLERANCE_C: f64 = 5.0;
const CONTEXT_OCCUPANCY_TOLERANCE: f64 = 0.2;
const IQR_FENCE: f64 = 1.5;
const FENCE_HIGH: f64 = 0.4;
const FENCE_MEDIUM: f64 = 0.25;

const EQUIPMENT_DROP_RATIO: f64 = 0.4;
const EQUIPMENT_SPIKE_RATIO: f64 = 2.0;
const SUSTAINED_HIGH_RATIO: f64 = 1.3;
const SUSTAINED_LOW_RATIO: f64 = 0.7;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DetectorKind {
    Statistical,
    Pattern,
    Contextual,
    Equipment,
}

pub const EVALUATION_ORDER: [DetectorKind; 4] = [
    DetectorKind::Statistical,
    DetectorKind::Pattern,
    DetectorKind::Contextual,
    DetectorKind::Equipment,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub anomaly_type: AnomalyType,
}

impl Finding {
    fn new(severity: Severity, anomaly_type: AnomalyType) -> Self {
        Self {
            severity,
            anomaly_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorOutcome {
    pub detector: DetectorKind,
    pub finding: Option<Finding>,
}

/// Everything a sub-detector may look at for one sample
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub current: &'a Sample,
    /// Trailing `window_size` samples, oldest first
    pub window: &'a [Sample],
    /// Trailing `equipment_window` samples, oldest first
    pub recent: &'a [Sample],
    pub baseline: &'a Baseline,
    pub sensitivity: Sensitivity,
}

impl ScoringContext<'_> {
    pub fn evaluate(&self, detector: DetectorKind) -> DetectorOutcome {
        let finding = match detector {
            DetectorKind::Statistical => statistical(self),
            DetectorKind::Pattern => pattern(self),
            DetectorKind::Contextual => contextual(self),
            DetectorKind::Equipment => equipment(self),
        };
        DetectorOutcome { detector, finding }
    }

    /// Run all sub-detectors in evaluation order
    pub fn evaluate_all(&self) -> Vec<DetectorOutcome> {
        EVALUATION_ORDER.iter().map(|d| self.evaluate(*d)).collect()
    }
}

fn spike_or_drop(value: f64, reference: f64) -> AnomalyType {
    if value > reference {
        AnomalyType::Spike
    } else {
        AnomalyType::Drop
    }
}

/// Z-score against the trailing window
pub fn statistical(ctx: &ScoringContext<'_>) -> Option<Finding> {
    let values = consumption(ctx.window);
    let window_mean = mean(&values)?;
    let x = ctx.current.consumption_kwh;
    let z = (x - window_mean).abs() / (std_dev(&values) + STD_EPSILON);

    let cutoffs = ctx.sensitivity.z_cutoffs();
    let severity = if z > cutoffs.high {
        Severity::High
    } else if z > cutoffs.medium {
        Severity::Medium
    } else if z > cutoffs.low {
        Severity::Low
    } else {
        return None;
    };

    Some(Finding::new(severity, spike_or_drop(x, window_mean)))
}

/// Relative deviation from the (day, hour) baseline median
pub fn pattern(ctx: &ScoringContext<'_>) -> Option<Finding> {
    let expected = ctx.baseline.expected_for(ctx.current)?;
    if expected <= 0.0 {
        return None;
    }

    let deviation = (ctx.current.consumption_kwh - expected).abs() / expected;
    let severity = if deviation > PATTERN_HIGH {
        Severity::High
    } else if deviation > PATTERN_MEDIUM {
        Severity::Medium
    } else if deviation > PATTERN_LOW {
        Severity::Low
    } else {
        return None;
    };

    Some(Finding::new(severity, AnomalyType::Pattern))
}

/// Tukey fence over trailing samples taken in comparable conditions
pub fn contextual(ctx: &ScoringContext<'_>) -> Option<Finding> {
    let current = ctx.current;
    let similar: Vec<f64> = ctx
        .window
        .iter()
        .filter(|s| {
            (s.temperature_c - current.temperature_c).abs() <= CONTEXT_TEMP_TOLERANCE_C
                && (s.occupancy_fraction - current.occupancy_fraction).abs()
                    <= CONTEXT_OCCUPANCY_TOLERANCE
                && s.is_business_hours() == current.is_business_hours()
        })
        .map(|s| s.consumption_kwh)
        .collect();

    if similar.len() < MIN_NEIGHBOURS {
        return None;
    }

    let q1 = quantile(&similar, 0.25)?;
    let q3 = quantile(&similar, 0.75)?;
    let iqr = q3 - q1;
    let lower = q1 - IQR_FENCE * iqr;
    let upper = q3 + IQR_FENCE * iqr;
    let x = current.consumption_kwh;

    let (bound, anomaly_type) = if x < lower {
        (lower, AnomalyType::Drop)
    } else if x > upper {
        (upper, AnomalyType::Spike)
    } else {
        return None;
    };

    let distance = (x - bound).abs() / bound.abs().max(STD_EPSILON);
    let severity = if distance > FENCE_HIGH {
        Severity::High
    } else if distance > FENCE_MEDIUM {
        Severity::Medium
    } else {
        Severity::Low
    };

    Some(Finding::new(severity, anomaly_type))
}

/// Sudden equipment failure/switch-on, or a run of readings far from normal
pub fn equipment(ctx: &ScoringContext<'_>) -> Option<Finding> {
    if ctx.recent.len() < MIN_NEIGHBOURS {
        return None;
    }

    let recent = consumption(ctx.recent);
    let recent_mean = mean(&recent)?;
    let x = ctx.current.consumption_kwh;

    if x < EQUIPMENT_DROP_RATIO * recent_mean {
        return Some(Finding::new(Severity::High, AnomalyType::Drop));
    }
    if x > EQUIPMENT_SPIKE_RATIO * recent_mean {
        return Some(Finding::new(Severity::High, AnomalyType::Spike));
    }

    // Sustained deviation is judged against the longer statistical window
    let reference = mean(&consumption(ctx.window))?;
    if reference <= 0.0 {
        return None;
    }
    let run = || recent.iter().copied().chain(std::iter::once(x));
    let sustained_high = run().all(|v| v > SUSTAINED_HIGH_RATIO * reference);
    let sustained_low = run().all(|v| v < SUSTAINED_LOW_RATIO * reference);

    if sustained_high || sustained_low {
        return Some(Finding::new(Severity::Medium, AnomalyType::Sustained));
    }
    None
}
