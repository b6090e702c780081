use tracing::{debug, info};

use super::{Optimizer, OptimizerError};
use crate::domain::{DayAheadPlan, TouPeriod};
use crate::utils::{round_cost, round_kwh};

impl Optimizer {
    /// Run [`Optimizer::optimize`] over consecutive periods, carrying the
    /// battery level from one period into the next.
    pub fn optimize_day_ahead(
        &self,
        demands: &[f64],
        solar: &[f64],
        prices: &[f64],
        tou: &[TouPeriod],
        initial_battery: f64,
    ) -> Result<DayAheadPlan, OptimizerError> {
        let n = demands.len();
        if solar.len() != n || prices.len() != n || tou.len() != n {
            return Err(OptimizerError::LengthMismatch {
                demands: n,
                solar: solar.len(),
                prices: prices.len(),
                tou: tou.len(),
            });
        }

        let mut level = self.clamp_battery(initial_battery);
        let mut periods = Vec::with_capacity(n);
        let mut battery_trajectory = Vec::with_capacity(n);

        for i in 0..n {
            let result = self.optimize(demands[i], solar[i], prices[i], level, tou[i]);
            level = self.clamp_battery(
                level - result.battery_discharge_kwh + result.battery_charge_kwh,
            );
            debug!(period = i, battery_kwh = level, grid_kwh = result.grid_kwh, "day-ahead step");
            battery_trajectory.push(round_kwh(level));
            periods.push(result);
        }

        let total_cost = round_cost(periods.iter().map(|p| p.cost).sum());
        let total_grid_kwh = round_kwh(periods.iter().map(|p| p.grid_kwh).sum());
        let total_carbon_saved_kg = round_kwh(periods.iter().map(|p| p.carbon_saved_kg).sum());

        info!(
            periods = n,
            total_cost,
            total_grid_kwh,
            final_battery_kwh = level,
            "day-ahead plan computed"
        );

        Ok(DayAheadPlan {
            periods,
            battery_trajectory,
            final_battery_level_kwh: round_kwh(level),
            total_cost,
            total_grid_kwh,
            total_carbon_saved_kg,
        })
    }
}
