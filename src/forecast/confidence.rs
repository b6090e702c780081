//! Confidence scoring for the ensemble forecast.

use serde::{Deserialize, Serialize};

use super::features::{consumption, mean, mean_abs_step, std_dev, tail};
use crate::domain::Sample;

const STABILITY_WINDOW: usize = 48;
const RECENCY_WINDOW: usize = 24;
const WEATHER_WINDOW: usize = 6;
const MIN_CONFIDENCE: f64 = 0.65;
const MAX_CONFIDENCE: f64 = 0.98;

/// Components of the confidence score, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub stability: f64,
    pub completeness: f64,
    pub recency: f64,
    pub weather_consistency: f64,
}

impl ConfidenceBreakdown {
    pub fn assess(history: &[Sample]) -> Self {
        Self {
            stability: stability(history),
            completeness: completeness(history),
            recency: recency(history),
            weather_consistency: weather_consistency(history),
        }
    }

    /// Weighted score clamped to [0.65, 0.98]
    pub fn score(&self) -> f64 {
        let raw = 0.3 * self.stability
            + 0.2 * self.completeness
            + 0.3 * self.recency
            + 0.2 * self.weather_consistency;
        // max/min rather than clamp so a NaN component lands on the floor
        raw.max(MIN_CONFIDENCE).min(MAX_CONFIDENCE)
    }
}

/// `1 - coefficient of variation` over the last 48 consumptions
fn stability(history: &[Sample]) -> f64 {
    let values = consumption(tail(history, STABILITY_WINDOW));
    match mean(&values) {
        Some(m) if m > 0.0 => (1.0 - std_dev(&values) / m).max(0.0),
        _ => 0.0,
    }
}

fn completeness(history: &[Sample]) -> f64 {
    let window = tail(history, STABILITY_WINDOW);
    if window.is_empty() {
        return 0.0;
    }
    window.iter().filter(|s| s.is_complete()).count() as f64 / window.len() as f64
}

fn recency(history: &[Sample]) -> f64 {
    let values = consumption(tail(history, RECENCY_WINDOW));
    (1.0 - mean_abs_step(&values) / 100.0).max(0.0).min(1.0)
}

fn weather_consistency(history: &[Sample]) -> f64 {
    let window = tail(history, WEATHER_WINDOW);
    let temps: Vec<f64> = window.iter().map(|s| s.temperature_c).collect();
    let irradiance: Vec<f64> = window.iter().map(|s| s.irradiance_wm2).collect();

    let temp_score = (1.0 - mean_abs_step(&temps) / 5.0).max(0.0);
    let irradiance_score = (1.0 - mean_abs_step(&irradiance) / 200.0).max(0.0);
    (temp_score + irradiance_score) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn flat_history(n: usize) -> Vec<Sample> {
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 4, 0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| Sample {
                timestamp: start + Duration::hours(i as i64),
                consumption_kwh: 30.0,
                temperature_c: 18.0,
                irradiance_wm2: 250.0,
                wind_speed_ms: 2.0,
                occupancy_fraction: 0.4,
                solar_generation_kwh: None,
            })
            .collect()
    }

    #[test]
    fn test_flat_history_hits_ceiling() {
        let breakdown = ConfidenceBreakdown::assess(&flat_history(48));
        assert_eq!(breakdown.stability, 1.0);
        assert_eq!(breakdown.completeness, 1.0);
        assert_eq!(breakdown.recency, 1.0);
        assert_eq!(breakdown.weather_consistency, 1.0);
        assert_eq!(breakdown.score(), 0.98);
    }

    #[test]
    fn test_erratic_history_hits_floor() {
        let mut history = flat_history(48);
        for (i, sample) in history.iter_mut().enumerate() {
            sample.consumption_kwh = if i % 2 == 0 { 0.0 } else { 250.0 };
            sample.temperature_c = if i % 2 == 0 { 0.0 } else { 30.0 };
            sample.irradiance_wm2 = f64::NAN;
        }
        let breakdown = ConfidenceBreakdown::assess(&history);
        assert_eq!(breakdown.recency, 0.0);
        assert_eq!(breakdown.completeness, 0.0);
        assert_eq!(breakdown.score(), 0.65);
    }
}
