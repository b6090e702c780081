use std::collections::BTreeMap;

use crate::domain::Sample;
use crate::forecast::features::median;

/// Median consumption per (day-of-week, hour-of-day) bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baseline {
    medians: BTreeMap<(u32, u32), f64>,
}

impl Baseline {
    pub fn get(&self, day_of_week: u32, hour: u32) -> Option<f64> {
        self.medians.get(&(day_of_week, hour)).copied()
    }

    /// Baseline entry for the sample's own bucket
    pub fn expected_for(&self, sample: &Sample) -> Option<f64> {
        self.get(sample.day_of_week(), sample.hour())
    }

    pub fn len(&self) -> usize {
        self.medians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medians.is_empty()
    }
}

/// Build the baseline from the whole history
pub fn build_baseline(history: &[Sample]) -> Baseline {
    let mut buckets: BTreeMap<(u32, u32), Vec<f64>> = BTreeMap::new();
    for sample in history {
        buckets
            .entry((sample.day_of_week(), sample.hour()))
            .or_default()
            .push(sample.consumption_kwh);
    }

    let medians = buckets
        .into_iter()
        .filter_map(|(key, values)| median(&values).map(|m| (key, m)))
        .collect();

    Baseline { medians }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn sample(hours: i64, consumption_kwh: f64) -> Sample {
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 4, 0, 0, 0)
            .unwrap();
        Sample {
            timestamp: start + Duration::hours(hours),
            consumption_kwh,
            temperature_c: 20.0,
            irradiance_wm2: 0.0,
            wind_speed_ms: 0.0,
            occupancy_fraction: 0.0,
            solar_generation_kwh: None,
        }
    }

    #[test]
    fn test_median_per_bucket() {
        let week = 7 * 24;
        let history = vec![
            sample(9, 10.0),
            sample(9 + week, 30.0),
            sample(9 + 2 * week, 20.0),
            sample(10, 5.0),
        ];
        let baseline = build_baseline(&history);

        assert_eq!(baseline.len(), 2);
        assert_eq!(baseline.get(0, 9), Some(20.0));
        assert_eq!(baseline.get(0, 10), Some(5.0));
        assert_eq!(baseline.get(1, 9), None);
        assert_eq!(baseline.expected_for(&history[1]), Some(20.0));
    }

    #[test]
    fn test_empty_history() {
        assert!(build_baseline(&[]).is_empty());
    }
}
