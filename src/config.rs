use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

use crate::anomaly::AnomalyConfig;
use crate::domain::FlexibleLoad;
use crate::forecast::ForecastConfig;
use crate::optimizer::{OptimizerConfig, TouSchedule};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "ENERGY__";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_initial_battery"))]
pub struct Config {
    #[validate(nested)]
    pub history: HistoryConfig,
    #[validate(nested)]
    pub forecast: ForecastConfig,
    #[validate(nested)]
    pub optimizer: OptimizerConfig,
    #[validate(nested)]
    pub pricing: PricingConfig,
    #[validate(nested)]
    pub battery: BatteryConfig,
    #[validate(nested)]
    pub anomaly: AnomalyConfig,
    #[validate(nested)]
    pub flexible_loads: Vec<FlexibleLoad>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HistoryConfig {
    /// Samples retained for one cycle (oldest evicted first)
    #[validate(range(min = 48))]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 24 * 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PricingConfig {
    /// Grid price before the time-of-use multiplier (currency/kWh)
    #[validate(range(min = 0.0))]
    pub base_grid_price: f64,
    #[validate(nested)]
    pub schedule: TouSchedule,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_grid_price: 0.12,
            schedule: TouSchedule::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BatteryConfig {
    /// Stored energy at startup (kWh)
    #[validate(range(min = 0.0))]
    pub initial_level_kwh: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            initial_level_kwh: 50.0,
        }
    }
}

fn validate_initial_battery(config: &Config) -> Result<(), ValidationError> {
    if config.battery.initial_level_kwh > config.optimizer.battery_capacity_kwh {
        return Err(ValidationError::new("initial_level_exceeds_capacity"));
    }
    Ok(())
}

impl Config {
    /// Defaults, then the TOML file at `path` (if present), then `ENERGY__*` env vars
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}
