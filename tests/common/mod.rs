#![allow(dead_code)]

use building_energy_advisor::domain::Sample;
use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use std::f64::consts::PI;

/// Monday 2024-03-04 00:00 at UTC+1
pub fn start() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 4, 0, 0, 0)
        .unwrap()
}

/// Hourly office-building profile: daily load curve, daylight irradiance and
/// a small deterministic wobble
pub fn office_history(hours: usize) -> Vec<Sample> {
    (0..hours)
        .map(|i| {
            let hour = (i % 24) as f64;
            let weekend = (i / 24) % 7 >= 5;
            let daylight = if (6.0..=18.0).contains(&hour) {
                (PI * (hour - 6.0) / 12.0).sin()
            } else {
                0.0
            };
            let occupancy = if !weekend && (8.0..18.0).contains(&hour) {
                0.8
            } else {
                0.1
            };
            Sample {
                timestamp: start() + Duration::hours(i as i64),
                consumption_kwh: 30.0
                    + 10.0 * (2.0 * PI * (hour - 9.0) / 24.0).sin()
                    + ((i * 7) % 5) as f64 * 0.3,
                temperature_c: 12.0 + 6.0 * daylight,
                irradiance_wm2: 700.0 * daylight,
                wind_speed_ms: 3.0,
                occupancy_fraction: occupancy,
                solar_generation_kwh: Some(12.0 * daylight),
            }
        })
        .collect()
}
