//! Feature and statistics helpers shared by the forecaster and the anomaly detector

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::domain::Sample;

/// Calendar features of the period being forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPeriod {
    pub timestamp: DateTime<FixedOffset>,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: u32,
    pub is_weekend: bool,
}

impl TargetPeriod {
    /// The hour following the given sample
    pub fn after(sample: &Sample) -> Self {
        Self::at(sample.timestamp + Duration::hours(1))
    }

    pub fn at(timestamp: DateTime<FixedOffset>) -> Self {
        let day_of_week = timestamp.weekday().num_days_from_monday();
        Self {
            timestamp,
            hour: timestamp.hour(),
            day_of_week,
            is_weekend: day_of_week >= 5,
        }
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, 0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    let Some(m) = mean(values) else {
        return 0.0;
    };
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean absolute difference between consecutive values
pub fn mean_abs_step(values: &[f64]) -> f64 {
    let steps: Vec<f64> = values
        .iter()
        .tuple_windows()
        .map(|(a, b)| (b - a).abs())
        .collect();
    mean(&steps).unwrap_or(0.0)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<OrderedFloat<f64>> = values.iter().copied().map(OrderedFloat).collect();
    out.sort();
    out.into_iter().map(|v| v.0).collect()
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q` is in [0, 1]; returns `None` for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Ordinary least squares fit of `values` against their index.
///
/// Returns `(slope, intercept)`; a single value yields a flat line.
pub fn linear_fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values)?;

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    let slope = if den.abs() < 1e-12 { 0.0 } else { num / den };
    Some((slope, y_mean - slope * x_mean))
}

/// Consumption values of a sample slice
pub fn consumption(samples: &[Sample]) -> Vec<f64> {
    samples.iter().map(|s| s.consumption_kwh).collect()
}

/// The last `n` items of a slice (all of it when shorter)
pub fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}
