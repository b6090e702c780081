use tracing::debug;

use super::Optimizer;
use crate::domain::{PriceAction, PriceResponse};
use crate::utils::{round_cost, round_score};

const USE_BATTERY_RATIO: f64 = 1.5;
const CHARGE_RATIO: f64 = 0.7;
const REDUCE_LOAD_RATIO: f64 = 1.2;
/// Minimum stored energy (kWh) before the battery is offered against a price spike
const MIN_BATTERY_FOR_SPIKE_KWH: f64 = 10.0;
const BATTERY_AVOIDED_SHARE: f64 = 0.7;
const LOAD_REDUCTION_SHARE: f64 = 0.1;

impl Optimizer {
    /// Classify the current price against the average and suggest an action
    pub fn respond_to_price(
        &self,
        current_price: f64,
        average_price: f64,
        battery_level: f64,
        solar: f64,
        demand: f64,
    ) -> PriceResponse {
        let price_ratio = if average_price > 0.0 {
            current_price / average_price
        } else {
            1.0
        };

        let (action, estimated_savings) =
            if price_ratio > USE_BATTERY_RATIO && battery_level > MIN_BATTERY_FOR_SPIKE_KWH {
                let avoided_kwh = demand.min(battery_level).max(0.0);
                (
                    PriceAction::UseBattery,
                    avoided_kwh * current_price * BATTERY_AVOIDED_SHARE,
                )
            } else if price_ratio < CHARGE_RATIO && solar > demand {
                (
                    PriceAction::ChargeBattery,
                    (average_price - current_price) * (solar - demand),
                )
            } else if price_ratio > REDUCE_LOAD_RATIO {
                (
                    PriceAction::ReduceLoad,
                    demand.max(0.0) * current_price * LOAD_REDUCTION_SHARE,
                )
            } else {
                (PriceAction::Maintain, 0.0)
            };

        debug!(%action, price_ratio, estimated_savings, "price response");

        PriceResponse {
            action,
            price_ratio: round_score(price_ratio),
            estimated_savings: round_cost(estimated_savings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // Spike with a charged battery
    #[case(0.40, 0.20, 50.0, 0.0, 30.0, PriceAction::UseBattery, 8.4)]
    // Spike but battery nearly empty: falls through to load reduction
    #[case(0.40, 0.20, 5.0, 0.0, 30.0, PriceAction::ReduceLoad, 1.2)]
    // Cheap energy and surplus solar
    #[case(0.10, 0.20, 20.0, 40.0, 30.0, PriceAction::ChargeBattery, 1.0)]
    // Cheap energy without surplus solar
    #[case(0.10, 0.20, 20.0, 10.0, 30.0, PriceAction::Maintain, 0.0)]
    // Moderately expensive
    #[case(0.26, 0.20, 50.0, 0.0, 30.0, PriceAction::ReduceLoad, 0.78)]
    #[case(0.20, 0.20, 50.0, 0.0, 30.0, PriceAction::Maintain, 0.0)]
    fn test_price_actions(
        #[case] current: f64,
        #[case] average: f64,
        #[case] battery: f64,
        #[case] solar: f64,
        #[case] demand: f64,
        #[case] action: PriceAction,
        #[case] savings: f64,
    ) {
        let response = Optimizer::default().respond_to_price(current, average, battery, solar, demand);
        assert_eq!(response.action, action);
        assert!((response.estimated_savings - savings).abs() < 1e-9);
    }

    #[test]
    fn test_zero_average_price() {
        let response = Optimizer::default().respond_to_price(0.3, 0.0, 50.0, 0.0, 10.0);
        assert_eq!(response.price_ratio, 1.0);
        assert_eq!(response.action, PriceAction::Maintain);
    }
}
