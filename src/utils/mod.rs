//! Output rounding shared by all engines.

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Energy values (kWh) to 2 decimals
pub fn round_kwh(value: f64) -> f64 {
    round_to(value, 2)
}

/// Percentages to 1 decimal
pub fn round_pct(value: f64) -> f64 {
    round_to(value, 1)
}

/// Unit prices to 3 decimals
pub fn round_price(value: f64) -> f64 {
    round_to(value, 3)
}

/// Currency amounts to 2 decimals
pub fn round_cost(value: f64) -> f64 {
    round_to(value, 2)
}

/// Scores and confidences to 3 decimals
pub fn round_score(value: f64) -> f64 {
    round_to(value, 3)
}
