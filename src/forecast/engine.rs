use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use super::confidence::ConfidenceBreakdown;
use super::consumption::ConsumptionComponents;
use super::features::TargetPeriod;
use super::production::SolarPersistenceModel;
use crate::domain::{ForecastResult, Sample};
use crate::utils::{round_kwh, round_score};

/// Smallest history the ensemble accepts (two days of hourly samples)
pub const MIN_HISTORY: usize = 48;
const DEMAND_FLOOR_KWH: f64 = 5.0;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Insufficient history: {required} samples required, {actual} provided")]
    InsufficientHistory { required: usize, actual: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ForecastConfig {
    /// Minimum number of samples before a forecast is attempted
    #[validate(range(min = 48))]
    pub min_history: usize,
    #[validate(range(min = 0.0))]
    pub panel_area_m2: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub panel_efficiency: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_history: MIN_HISTORY,
            panel_area_m2: 100.0,
            panel_efficiency: 0.18,
        }
    }
}

/// Ensemble forecaster for next-period demand and solar availability
#[derive(Debug, Clone)]
pub struct Forecaster {
    min_history: usize,
    solar: SolarPersistenceModel,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

impl Forecaster {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            min_history: config.min_history.max(MIN_HISTORY),
            solar: SolarPersistenceModel {
                panel_area_m2: config.panel_area_m2,
                panel_efficiency: config.panel_efficiency,
                ..SolarPersistenceModel::default()
            },
        }
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    /// Forecast the hour following the newest sample
    pub fn forecast(&self, history: &[Sample]) -> Result<ForecastResult, ForecastError> {
        let latest = match history.last() {
            Some(latest) if history.len() >= self.min_history => latest,
            _ => {
                return Err(ForecastError::InsufficientHistory {
                    required: self.min_history,
                    actual: history.len(),
                })
            }
        };

        let target = TargetPeriod::after(latest);
        let components = ConsumptionComponents::compute(history, &target);
        let demand = components.weighted().max(DEMAND_FLOOR_KWH);
        let solar = self.solar.predict(latest, &target).max(0.0);
        let confidence = ConfidenceBreakdown::assess(history);

        debug!(
            target = %target.timestamp,
            pattern = components.historical_pattern,
            trend = components.trend,
            weather = components.weather_similarity,
            occupancy = components.occupancy_projection,
            solar,
            ?confidence,
            "ensemble forecast computed"
        );

        Ok(ForecastResult {
            next_period_demand_kwh: round_kwh(demand),
            solar_available_kwh: round_kwh(solar),
            confidence: round_score(confidence.score()),
        })
    }
}
