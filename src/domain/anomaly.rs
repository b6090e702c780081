use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Anomaly severity, ordered low < medium < high
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Numeric score used for confidence (low=1, medium=2, high=3)
    pub fn score(&self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnomalyType {
    Spike,
    Drop,
    Sustained,
    Pattern,
}

/// Verdict for one evaluated sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub value: f64,
    pub is_anomaly: bool,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub anomaly_type: Option<AnomalyType>,
    pub confidence: Option<f64>,
}

/// Counts over the flagged records of one detection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub evaluated: usize,
    pub anomalies: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_type: BTreeMap<AnomalyType, usize>,
}

impl AnomalySummary {
    pub fn from_records(records: &[AnomalyRecord]) -> Self {
        let mut summary = Self {
            evaluated: records.len(),
            ..Self::default()
        };

        for record in records.iter().filter(|r| r.is_anomaly) {
            summary.anomalies += 1;
            *summary.by_severity.entry(record.severity).or_insert(0) += 1;
            if let Some(kind) = record.anomaly_type {
                *summary.by_type.entry(kind).or_insert(0) += 1;
            }
        }

        summary
    }

    pub fn count_severity(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn count_type(&self, kind: AnomalyType) -> usize {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }
}
