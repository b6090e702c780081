use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

use super::TouPeriod;

/// Merit-order split of one period's demand across solar, battery and grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub grid_kwh: f64,
    /// Solar energy used directly by the building
    pub solar_kwh: f64,
    pub battery_discharge_kwh: f64,
    /// Energy stored in the battery (after round-trip losses)
    pub battery_charge_kwh: f64,
    /// Solar the battery could not absorb
    pub excess_solar_kwh: f64,
    pub cost: f64,
    pub carbon_saved_kg: f64,
    pub renewable_pct: f64,
    pub peak_reduction_pct: f64,
    pub grid_stress_reduction_pct: f64,
    pub time_of_use: TouPeriod,
    pub effective_price: f64,
}

/// Period-by-period rollout with the battery level threaded between periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAheadPlan {
    pub periods: Vec<OptimizationResult>,
    /// Battery level after each period (kWh)
    pub battery_trajectory: Vec<f64>,
    pub final_battery_level_kwh: f64,
    pub total_cost: f64,
    pub total_grid_kwh: f64,
    pub total_carbon_saved_kg: f64,
}

/// A deferrable load that may run in any of its allowed hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FlexibleLoad {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub kwh: f64,
    #[validate(length(min = 1))]
    pub allowed_hours: Vec<usize>,
    /// Hour the load would run without advice; first allowed hour when absent
    #[serde(default)]
    pub default_hour: Option<usize>,
}

impl FlexibleLoad {
    pub fn effective_default_hour(&self) -> Option<usize> {
        self.default_hour.or_else(|| self.allowed_hours.first().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadShiftRecommendation {
    pub name: String,
    pub default_hour: usize,
    pub recommended_hour: usize,
    pub cost_at_default: f64,
    pub cost_at_recommended: f64,
    /// Signed: negative when the recommended hour costs more than the default
    pub savings: f64,
}

/// Real-time reaction to the current price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PriceAction {
    UseBattery,
    ChargeBattery,
    ReduceLoad,
    Maintain,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub action: PriceAction,
    pub price_ratio: f64,
    pub estimated_savings: f64,
}
