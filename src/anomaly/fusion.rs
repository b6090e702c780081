use chrono::{DateTime, FixedOffset};

use super::detectors::{DetectorOutcome, Finding};
use crate::domain::{AnomalyRecord, Severity};
use crate::utils::round_score;

/// Confidence reported for samples no detector flagged
pub const CLEAN_CONFIDENCE: f64 = 0.95;
const MAX_CONFIDENCE: f64 = 0.98;
const DETECTOR_COUNT: f64 = 4.0;

/// Strongest finding across detectors: highest severity, then earliest detector
pub fn strongest(outcomes: &[DetectorOutcome]) -> Option<Finding> {
    outcomes
        .iter()
        .filter_map(|o| o.finding.map(|f| (o.detector, f)))
        .max_by(|(da, a), (db, b)| a.severity.cmp(&b.severity).then(db.cmp(da)))
        .map(|(_, f)| f)
}

/// Confidence for a flagged sample, from how many detectors agree and how strongly
pub fn fused_confidence(outcomes: &[DetectorOutcome]) -> Option<f64> {
    let scores: Vec<f64> = outcomes
        .iter()
        .filter_map(|o| o.finding.map(|f| f.severity.score()))
        .collect();
    if scores.is_empty() {
        return None;
    }
    let count = scores.len() as f64;
    let mean_score = scores.iter().sum::<f64>() / count;
    let raw = 0.5 + (mean_score / 3.0) * 0.3 + (count / DETECTOR_COUNT) * 0.2;
    Some(round_score(raw.min(MAX_CONFIDENCE)))
}

/// Combine sub-detector outcomes into the record for one sample
pub fn fuse(
    timestamp: DateTime<FixedOffset>,
    value: f64,
    outcomes: &[DetectorOutcome],
) -> AnomalyRecord {
    match (strongest(outcomes), fused_confidence(outcomes)) {
        (Some(finding), Some(confidence)) => AnomalyRecord {
            timestamp,
            value,
            is_anomaly: true,
            severity: finding.severity,
            anomaly_type: Some(finding.anomaly_type),
            confidence: Some(confidence),
        },
        _ => AnomalyRecord {
            timestamp,
            value,
            is_anomaly: false,
            severity: Severity::Low,
            anomaly_type: None,
            confidence: Some(CLEAN_CONFIDENCE),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::detectors::DetectorKind;
    use crate::domain::AnomalyType;
    use chrono::TimeZone;

    fn outcome(
        detector: DetectorKind,
        finding: Option<(Severity, AnomalyType)>,
    ) -> DetectorOutcome {
        DetectorOutcome {
            detector,
            finding: finding.map(|(severity, anomaly_type)| Finding {
                severity,
                anomaly_type,
            }),
        }
    }

    fn ts() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 4, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_highest_severity_wins() {
        let outcomes = [
            outcome(DetectorKind::Statistical, Some((Severity::Medium, AnomalyType::Spike))),
            outcome(DetectorKind::Pattern, Some((Severity::High, AnomalyType::Pattern))),
            outcome(DetectorKind::Contextual, None),
            outcome(DetectorKind::Equipment, None),
        ];
        let record = fuse(ts(), 42.0, &outcomes);
        assert!(record.is_anomaly);
        assert_eq!(record.severity, Severity::High);
        assert_eq!(record.anomaly_type, Some(AnomalyType::Pattern));
        // 0.5 + (2.5 / 3) * 0.3 + 0.5 * 0.2 = 0.85
        assert_eq!(record.confidence, Some(0.85));
    }

    #[test]
    fn test_ties_go_to_earlier_detector() {
        let outcomes = [
            outcome(DetectorKind::Statistical, Some((Severity::High, AnomalyType::Spike))),
            outcome(DetectorKind::Pattern, Some((Severity::High, AnomalyType::Pattern))),
            outcome(DetectorKind::Contextual, Some((Severity::High, AnomalyType::Spike))),
            outcome(DetectorKind::Equipment, Some((Severity::High, AnomalyType::Spike))),
        ];
        let record = fuse(ts(), 42.0, &outcomes);
        assert_eq!(record.anomaly_type, Some(AnomalyType::Spike));
        assert_eq!(record.confidence, Some(0.98));

        let reordered = [outcomes[1], outcomes[0]];
        assert_eq!(
            strongest(&reordered).map(|f| f.anomaly_type),
            Some(AnomalyType::Spike)
        );
    }

    #[test]
    fn test_clean_sample() {
        let outcomes = [
            outcome(DetectorKind::Statistical, None),
            outcome(DetectorKind::Pattern, None),
        ];
        let record = fuse(ts(), 20.0, &outcomes);
        assert!(!record.is_anomaly);
        assert_eq!(record.severity, Severity::Low);
        assert_eq!(record.anomaly_type, None);
        assert_eq!(record.confidence, Some(CLEAN_CONFIDENCE));
    }
}
