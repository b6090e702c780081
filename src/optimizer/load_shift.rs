use tracing::{debug, warn};

use super::Optimizer;
use crate::domain::{FlexibleLoad, LoadShiftRecommendation};
use crate::utils::round_cost;

/// Grid cost of running `kwh` extra at `hour`, after solar covers what it can
fn marginal_cost(kwh: f64, hour: usize, demand: &[f64], solar: &[f64], prices: &[f64]) -> Option<f64> {
    let d = demand.get(hour)?;
    let s = solar.get(hour)?;
    let p = prices.get(hour)?;
    Some((d + kwh - s).max(0.0) * p)
}

impl Optimizer {
    /// Pick the cheapest allowed hour for every flexible load.
    ///
    /// Ties go to the earliest hour in `allowed_hours`. Savings are reported
    /// against the load's default hour and keep their sign.
    pub fn recommend_load_shifts(
        &self,
        loads: &[FlexibleLoad],
        demand: &[f64],
        solar: &[f64],
        prices: &[f64],
    ) -> Vec<LoadShiftRecommendation> {
        let mut recommendations = Vec::with_capacity(loads.len());

        for load in loads {
            let mut best: Option<(usize, f64)> = None;
            for &hour in &load.allowed_hours {
                let Some(cost) = marginal_cost(load.kwh, hour, demand, solar, prices) else {
                    warn!(load = %load.name, hour, "allowed hour outside the price profile, skipped");
                    continue;
                };
                if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                    best = Some((hour, cost));
                }
            }

            let Some((recommended_hour, cost_at_recommended)) = best else {
                warn!(load = %load.name, "no usable hour for flexible load");
                continue;
            };

            let default_hour = load.effective_default_hour().unwrap_or(recommended_hour);
            let cost_at_default = marginal_cost(load.kwh, default_hour, demand, solar, prices)
                .unwrap_or(cost_at_recommended);

            debug!(
                load = %load.name,
                default_hour,
                recommended_hour,
                cost_at_default,
                cost_at_recommended,
                "load shift evaluated"
            );

            recommendations.push(LoadShiftRecommendation {
                name: load.name.clone(),
                default_hour,
                recommended_hour,
                cost_at_default: round_cost(cost_at_default),
                cost_at_recommended: round_cost(cost_at_recommended),
                savings: round_cost(cost_at_default - cost_at_recommended),
            });
        }

        recommendations
    }
}
