use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::TouPeriod;

/// Price multipliers applied to the base grid price per time-of-use period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TouMultipliers {
    #[validate(range(min = 0.0))]
    pub peak: f64,
    #[validate(range(min = 0.0))]
    pub mid_peak: f64,
    #[validate(range(min = 0.0))]
    pub off_peak: f64,
}

impl Default for TouMultipliers {
    fn default() -> Self {
        Self {
            peak: 1.8,
            mid_peak: 1.0,
            off_peak: 0.6,
        }
    }
}

impl TouMultipliers {
    pub fn for_period(&self, period: TouPeriod) -> f64 {
        match period {
            TouPeriod::Peak => self.peak,
            TouPeriod::MidPeak => self.mid_peak,
            TouPeriod::OffPeak => self.off_peak,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OptimizerConfig {
    // Battery physical constraints
    #[validate(range(exclusive_min = 0.0))]
    pub battery_capacity_kwh: f64,
    /// Share of charged energy that can later be discharged (0..1]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub round_trip_efficiency: f64,
    /// Effective price above which the battery discharges outside peak
    #[validate(range(min = 0.0))]
    pub discharge_price_threshold: f64,
    /// Demand above which peak reduction is reported
    #[validate(range(min = 0.0))]
    pub peak_demand_threshold_kwh: f64,
    #[validate(range(min = 0.0))]
    pub carbon_factor_kg_per_kwh: f64,
    #[validate(nested)]
    pub multipliers: TouMultipliers,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            battery_capacity_kwh: 100.0,
            round_trip_efficiency: 0.9,
            discharge_price_threshold: 0.15,
            peak_demand_threshold_kwh: 40.0,
            carbon_factor_kg_per_kwh: 0.8,
            multipliers: TouMultipliers::default(),
        }
    }
}
