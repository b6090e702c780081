//! Consumption sub-forecasts combined by the ensemble in [`super::Forecaster`].

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::features::{consumption, linear_fit, mean, tail, TargetPeriod};
use crate::domain::Sample;

const PATTERN_MATCHES: usize = 10;
const PATTERN_RECENCY_BASE: f64 = 1.1;
const MIN_MATCHES: usize = 3;
const TREND_WINDOW: usize = 24;
const WEATHER_WINDOW: usize = 48;
const WEATHER_TEMP_TOLERANCE_C: f64 = 3.0;
const WEATHER_IRRADIANCE_TOLERANCE: f64 = 100.0;
const BASE_LOAD_KWH: f64 = 25.0;
const OCCUPANCY_LOAD_KWH: f64 = 15.0;

/// Ensemble weights, in the order the components are listed in
/// [`ConsumptionComponents`].
pub const ENSEMBLE_WEIGHTS: [f64; 4] = [0.35, 0.25, 0.25, 0.15];

/// Individual consumption estimates for one target period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionComponents {
    pub historical_pattern: f64,
    pub trend: f64,
    pub weather_similarity: f64,
    pub occupancy_projection: f64,
}

impl ConsumptionComponents {
    pub fn compute(history: &[Sample], target: &TargetPeriod) -> Self {
        Self {
            historical_pattern: historical_pattern(history, target),
            trend: trend(history),
            weather_similarity: weather_similarity(history),
            occupancy_projection: occupancy_projection(target),
        }
    }

    pub fn weighted(&self) -> f64 {
        let parts = [
            self.historical_pattern,
            self.trend,
            self.weather_similarity,
            self.occupancy_projection,
        ];
        parts
            .iter()
            .zip(ENSEMBLE_WEIGHTS.iter())
            .map(|(value, weight)| value * weight)
            .sum()
    }
}

fn latest_value(history: &[Sample]) -> f64 {
    history.last().map(|s| s.consumption_kwh).unwrap_or(0.0)
}

/// Recency-weighted mean of the samples sharing the target's hour and weekday.
///
/// Falls back to the mean of all same-hour samples, then to the latest value.
pub fn historical_pattern(history: &[Sample], target: &TargetPeriod) -> f64 {
    let matches: Vec<f64> = history
        .iter()
        .filter(|s| s.hour() == target.hour && s.day_of_week() == target.day_of_week)
        .map(|s| s.consumption_kwh)
        .collect();

    if matches.len() >= MIN_MATCHES {
        let recent = tail(&matches, PATTERN_MATCHES);
        let (weighted_sum, weight_total) = recent.iter().enumerate().fold(
            (0.0, 0.0),
            |(sum, total), (rank, value)| {
                let weight = PATTERN_RECENCY_BASE.powi(rank as i32);
                (sum + value * weight, total + weight)
            },
        );
        return weighted_sum / weight_total;
    }

    let same_hour: Vec<f64> = history
        .iter()
        .filter(|s| s.hour() == target.hour)
        .map(|s| s.consumption_kwh)
        .collect();

    mean(&same_hour).unwrap_or_else(|| latest_value(history))
}

/// Linear trend over the last 24 samples, extrapolated one step ahead
pub fn trend(history: &[Sample]) -> f64 {
    let values = consumption(tail(history, TREND_WINDOW));
    match linear_fit(&values) {
        Some((slope, intercept)) => intercept + slope * values.len() as f64,
        None => latest_value(history),
    }
}

/// Mean consumption of recent samples with weather close to the latest sample
pub fn weather_similarity(history: &[Sample]) -> f64 {
    let Some(latest) = history.last() else {
        return 0.0;
    };

    let similar: Vec<f64> = tail(history, WEATHER_WINDOW)
        .iter()
        .filter(|s| {
            (s.temperature_c - latest.temperature_c).abs() <= WEATHER_TEMP_TOLERANCE_C
                && (s.irradiance_wm2 - latest.irradiance_wm2).abs() <= WEATHER_IRRADIANCE_TOLERANCE
        })
        .map(|s| s.consumption_kwh)
        .collect();

    if similar.len() < MIN_MATCHES {
        return latest.consumption_kwh;
    }
    mean(&similar).unwrap_or(latest.consumption_kwh)
}

/// Expected occupancy share for the target hour
pub fn expected_occupancy(target: &TargetPeriod) -> f64 {
    let h = target.hour as f64;
    if target.is_weekend {
        if (9..=17).contains(&target.hour) {
            0.2 + 0.3 * (PI * (h - 9.0) / 8.0).sin()
        } else {
            0.05
        }
    } else if (7..=19).contains(&target.hour) {
        0.3 + 0.6 * (PI * (h - 7.0) / 12.0).sin()
    } else {
        0.1
    }
}

/// Load implied by the occupancy model
pub fn occupancy_projection(target: &TargetPeriod) -> f64 {
    BASE_LOAD_KWH + expected_occupancy(target) * OCCUPANCY_LOAD_KWH
}
