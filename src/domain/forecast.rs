use serde::{Deserialize, Serialize};

/// Forecast confidence band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForecastConfidence {
    High,   // >= 0.9
    Medium, // 0.7 - 0.9
    Low,    // < 0.7
}

impl std::fmt::Display for ForecastConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl ForecastConfidence {
    /// Classify a numerical confidence score (0.0 - 1.0)
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::High
        } else if score >= 0.7 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Next-period demand and solar estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Expected building demand for the next hour (kWh, >= 5)
    pub next_period_demand_kwh: f64,
    /// Expected solar generation for the next hour (kWh, >= 0)
    pub solar_available_kwh: f64,
    /// Ensemble confidence (0.65 - 0.98)
    pub confidence: f64,
}

impl ForecastResult {
    pub fn confidence_band(&self) -> ForecastConfidence {
        ForecastConfidence::from_score(self.confidence)
    }
}
