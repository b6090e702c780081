use tracing::debug;

use super::OptimizerConfig;
use crate::domain::{OptimizationResult, TouPeriod};
use crate::utils::{round_cost, round_kwh, round_pct, round_price};

/// Merit-order dispatcher: solar first, then battery, then grid.
///
/// The order is fixed; it is not re-optimized by marginal cost. Battery
/// discharge is reserved for peak periods or expensive energy.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Configured capacity; a negative or NaN value counts as no battery
    pub fn battery_capacity_kwh(&self) -> f64 {
        self.config.battery_capacity_kwh.max(0.0)
    }

    /// Grid price after the time-of-use multiplier
    pub fn effective_price(&self, grid_price: f64, tou_period: TouPeriod) -> f64 {
        grid_price * self.config.multipliers.for_period(tou_period)
    }

    /// Clamp a battery level into `[0, capacity]`
    pub fn clamp_battery(&self, level_kwh: f64) -> f64 {
        level_kwh.max(0.0).min(self.battery_capacity_kwh())
    }

    /// Split one period's demand across solar, battery and grid
    pub fn optimize(
        &self,
        demand: f64,
        solar_available: f64,
        grid_price: f64,
        battery_level: f64,
        tou_period: TouPeriod,
    ) -> OptimizationResult {
        let demand = demand.max(0.0);
        let solar_available = solar_available.max(0.0);
        let battery_level = self.clamp_battery(battery_level);
        let efficiency = self.config.round_trip_efficiency.max(0.0).min(1.0);
        let effective_price = self.effective_price(grid_price, tou_period);

        // 1. Solar serves demand directly
        let solar_used = solar_available.min(demand);
        let mut remaining = demand - solar_used;

        // 2. Leftover solar charges the battery, the rest is exported/curtailed
        let leftover_solar = solar_available - solar_used;
        let headroom = (self.battery_capacity_kwh() - battery_level).max(0.0);
        let battery_charge = (leftover_solar * efficiency).min(headroom);
        let excess_solar = if efficiency > 0.0 {
            (leftover_solar - battery_charge / efficiency).max(0.0)
        } else {
            leftover_solar
        };

        // 3. Battery covers the remainder only when energy is expensive
        let discharge_allowed = tou_period == TouPeriod::Peak
            || effective_price > self.config.discharge_price_threshold;
        let battery_discharge = if discharge_allowed {
            remaining.min(battery_level)
        } else {
            0.0
        };
        remaining -= battery_discharge;

        // 4. Grid takes the residual
        let grid = remaining.max(0.0);

        let renewable = solar_used + battery_discharge;
        let renewable_pct = if demand > 0.0 {
            renewable / demand * 100.0
        } else {
            0.0
        };
        let peak_threshold = self.config.peak_demand_threshold_kwh;
        let peak_reduction_pct = if demand > peak_threshold && grid < peak_threshold {
            (demand - grid) / demand * 100.0
        } else {
            0.0
        };
        let grid_stress_reduction_pct = if demand > 0.0 {
            (1.0 - grid / demand) * 100.0
        } else {
            0.0
        };

        debug!(
            demand,
            solar_used,
            battery_charge,
            battery_discharge,
            grid,
            %tou_period,
            effective_price,
            "merit-order dispatch"
        );

        OptimizationResult {
            grid_kwh: round_kwh(grid),
            solar_kwh: round_kwh(solar_used),
            battery_discharge_kwh: round_kwh(battery_discharge),
            battery_charge_kwh: round_kwh(battery_charge),
            excess_solar_kwh: round_kwh(excess_solar),
            cost: round_cost(grid * effective_price),
            carbon_saved_kg: round_kwh(renewable * self.config.carbon_factor_kg_per_kwh),
            renewable_pct: round_pct(renewable_pct.clamp(0.0, 100.0)),
            peak_reduction_pct: round_pct(peak_reduction_pct.clamp(0.0, 100.0)),
            grid_stress_reduction_pct: round_pct(grid_stress_reduction_pct.clamp(0.0, 100.0)),
            time_of_use: tou_period,
            effective_price: round_price(effective_price),
        }
    }
}
