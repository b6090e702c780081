use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::anomaly::AnomalyDetector;
use crate::config::Config;
use crate::domain::{
    ensure_ordered, AnomalyRecord, AnomalySummary, FlexibleLoad, ForecastConfidence,
    ForecastResult, LoadShiftRecommendation, OptimizationResult, Sample,
};
use crate::forecast::features::{consumption, mean, TargetPeriod};
use crate::forecast::Forecaster;
use crate::optimizer::{Optimizer, TouSchedule};
use crate::utils::round_kwh;

/// Outcome of one advisory cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Start of the forecast hour
    pub target_timestamp: DateTime<FixedOffset>,
    pub forecast: ForecastResult,
    pub confidence_band: ForecastConfidence,
    pub dispatch: OptimizationResult,
    /// Battery level after applying the dispatch
    pub battery_level_kwh: f64,
    pub load_shifts: Vec<LoadShiftRecommendation>,
    /// Flagged records only
    pub anomalies: Vec<AnomalyRecord>,
    pub summary: AnomalySummary,
}

/// Runs forecast, dispatch and anomaly detection over one history and keeps
/// the battery level between cycles
#[derive(Debug, Clone)]
pub struct EnergyAdvisor {
    forecaster: Forecaster,
    optimizer: Optimizer,
    detector: AnomalyDetector,
    schedule: TouSchedule,
    base_grid_price: f64,
    flexible_loads: Vec<FlexibleLoad>,
    battery_level_kwh: f64,
}

impl EnergyAdvisor {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let optimizer = Optimizer::new(config.optimizer.clone());
        let battery_level_kwh = optimizer.clamp_battery(config.battery.initial_level_kwh);
        Ok(Self {
            forecaster: Forecaster::new(&config.forecast),
            optimizer,
            detector: AnomalyDetector::new(config.anomaly.clone()),
            schedule: config.pricing.schedule.clone(),
            base_grid_price: config.pricing.base_grid_price,
            flexible_loads: config.flexible_loads.clone(),
            battery_level_kwh,
        })
    }

    pub fn battery_level_kwh(&self) -> f64 {
        self.battery_level_kwh
    }

    /// One serialized cycle: forecast, dispatch, battery update, detection
    pub fn run_cycle(&mut self, history: &[Sample]) -> Result<CycleReport> {
        ensure_ordered(history).context("history is not in timestamp order")?;
        let forecast = self
            .forecaster
            .forecast(history)
            .context("forecast failed")?;
        let latest = history.last().context("history is empty")?;
        let target = TargetPeriod::after(latest);
        let tou_period = self.schedule.period_for_hour(target.hour);

        let dispatch = self.optimizer.optimize(
            forecast.next_period_demand_kwh,
            forecast.solar_available_kwh,
            self.base_grid_price,
            self.battery_level_kwh,
            tou_period,
        );
        self.battery_level_kwh = round_kwh(self.optimizer.clamp_battery(
            self.battery_level_kwh - dispatch.battery_discharge_kwh + dispatch.battery_charge_kwh,
        ));

        let load_shifts = self.plan_load_shifts(history);

        let records = self.detector.detect(history);
        let summary = AnomalyDetector::summarize(&records);
        let anomalies: Vec<AnomalyRecord> = records.into_iter().filter(|r| r.is_anomaly).collect();

        info!(
            target = %target.timestamp,
            demand_kwh = forecast.next_period_demand_kwh,
            solar_kwh = forecast.solar_available_kwh,
            confidence = forecast.confidence,
            %tou_period,
            grid_kwh = dispatch.grid_kwh,
            battery_level_kwh = self.battery_level_kwh,
            anomalies = summary.anomalies,
            "advisory cycle complete"
        );

        Ok(CycleReport {
            target_timestamp: target.timestamp,
            confidence_band: forecast.confidence_band(),
            forecast,
            dispatch,
            battery_level_kwh: self.battery_level_kwh,
            load_shifts,
            anomalies,
            summary,
        })
    }

    /// Load-shift advice against an hour-of-day profile averaged over the history
    pub fn plan_load_shifts(&self, history: &[Sample]) -> Vec<LoadShiftRecommendation> {
        if self.flexible_loads.is_empty() {
            return Vec::new();
        }
        let (demand, solar) = hourly_profile(history);
        let prices: Vec<f64> = self
            .schedule
            .day_profile()
            .into_iter()
            .map(|period| self.optimizer.effective_price(self.base_grid_price, period))
            .collect();
        self.optimizer
            .recommend_load_shifts(&self.flexible_loads, &demand, &solar, &prices)
    }
}

/// Mean consumption and solar generation per hour of day (24 entries)
fn hourly_profile(history: &[Sample]) -> (Vec<f64>, Vec<f64>) {
    let overall = mean(&consumption(history)).unwrap_or(0.0);
    (0..24u32)
        .map(|hour| {
            let at_hour: Vec<&Sample> = history.iter().filter(|s| s.hour() == hour).collect();
            let demand: Vec<f64> = at_hour.iter().map(|s| s.consumption_kwh).collect();
            let solar: Vec<f64> = at_hour
                .iter()
                .map(|s| s.solar_generation_kwh.unwrap_or(0.0))
                .collect();
            (
                mean(&demand).unwrap_or(overall),
                mean(&solar).unwrap_or(0.0),
            )
        })
        .unzip()
}
