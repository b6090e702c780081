use serde::{Deserialize, Serialize};

use super::features::TargetPeriod;
use crate::domain::Sample;

const CLEAR_SKY_IRRADIANCE: f64 = 800.0;
const PERSISTENCE_WEIGHT: f64 = 0.8;
const CLOUDY_THRESHOLD_WM2: f64 = 200.0;
const CLOUD_PERSISTENCE_FACTOR: f64 = 0.7;
const TEMP_COEFFICIENT: f64 = 0.004;
const REFERENCE_TEMP_C: f64 = 25.0;
const MIN_DERATE: f64 = 0.7;

/// Persistence model for next-hour PV generation.
///
/// Blends the current irradiance with a clear-sky daylight curve and converts
/// the result to energy through a fixed panel array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPersistenceModel {
    pub panel_area_m2: f64,
    pub panel_efficiency: f64,
    pub sunrise_hour: u32,
    pub sunset_hour: u32,
}

impl Default for SolarPersistenceModel {
    fn default() -> Self {
        Self {
            panel_area_m2: 100.0,
            panel_efficiency: 0.18,
            sunrise_hour: 6,
            sunset_hour: 18,
        }
    }
}

impl SolarPersistenceModel {
    /// Clear-sky shape for the hour (0 at sunrise/sunset, 1 at solar noon)
    fn time_of_day_factor(&self, hour: u32) -> f64 {
        let day_len = self.sunset_hour.saturating_sub(self.sunrise_hour).max(1) as f64;
        let x = (hour as f64 - self.sunrise_hour as f64) / day_len;
        (std::f64::consts::PI * x).sin().max(0.0)
    }

    /// Irradiance expected during the target hour (W/m²)
    pub fn expected_irradiance(&self, current_irradiance: f64, target: &TargetPeriod) -> f64 {
        if target.hour < self.sunrise_hour || target.hour > self.sunset_hour {
            return 0.0;
        }

        let clear_sky = CLEAR_SKY_IRRADIANCE * self.time_of_day_factor(target.hour);
        let mut irradiance =
            PERSISTENCE_WEIGHT * current_irradiance + (1.0 - PERSISTENCE_WEIGHT) * clear_sky;

        if current_irradiance < CLOUDY_THRESHOLD_WM2 {
            irradiance *= CLOUD_PERSISTENCE_FACTOR;
        }
        irradiance.max(0.0)
    }

    /// Panel output derating for cell temperature
    pub fn temperature_derate(temperature_c: f64) -> f64 {
        (1.0 - (temperature_c - REFERENCE_TEMP_C) * TEMP_COEFFICIENT).max(MIN_DERATE)
    }

    /// Generation (kWh) over the target hour, based on the latest sample
    pub fn predict(&self, latest: &Sample, target: &TargetPeriod) -> f64 {
        let irradiance = self.expected_irradiance(latest.irradiance_wm2, target);
        let kwh = irradiance * self.panel_efficiency * self.panel_area_m2 / 1000.0
            * Self::temperature_derate(latest.temperature_c);
        kwh.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn latest(irradiance: f64, temperature: f64) -> Sample {
        Sample {
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 3, 11, 0, 0)
                .unwrap(),
            consumption_kwh: 30.0,
            temperature_c: temperature,
            irradiance_wm2: irradiance,
            wind_speed_ms: 1.0,
            occupancy_fraction: 0.5,
            solar_generation_kwh: None,
        }
    }

    #[test]
    fn test_noon_clear_sky() {
        let model = SolarPersistenceModel::default();
        let sample = latest(600.0, 25.0);
        let target = TargetPeriod::after(&sample);
        // 0.8*600 + 0.2*800*1.0 = 640 W/m², 640*0.18*100/1000 = 11.52 kWh
        assert!((model.predict(&sample, &target) - 11.52).abs() < 1e-9);
    }

    #[test]
    fn test_cloud_persistence_dampens() {
        let model = SolarPersistenceModel::default();
        let sample = latest(100.0, 25.0);
        let target = TargetPeriod::after(&sample);
        // (0.8*100 + 160) * 0.7 = 168 W/m²
        assert!((model.expected_irradiance(100.0, &target) - 168.0).abs() < 1e-9);
    }

    #[test]
    fn test_night_is_zero() {
        let model = SolarPersistenceModel::default();
        let sample = latest(500.0, 20.0);
        let target = TargetPeriod::at(sample.timestamp + chrono::Duration::hours(9)); // 20:00
        assert_eq!(model.predict(&sample, &target), 0.0);
    }

    #[test]
    fn test_temperature_derate_is_floored() {
        assert_eq!(SolarPersistenceModel::temperature_derate(25.0), 1.0);
        assert!((SolarPersistenceModel::temperature_derate(35.0) - 0.96).abs() < 1e-12);
        assert_eq!(SolarPersistenceModel::temperature_derate(200.0), 0.7);
    }
}
