//! End-to-end checks across forecasting, dispatch and anomaly detection.

mod common;

use building_energy_advisor::advisor::EnergyAdvisor;
use building_energy_advisor::anomaly::{AnomalyConfig, AnomalyDetector};
use building_energy_advisor::config::Config;
use building_energy_advisor::domain::{
    AnomalyType, HistoryError, Sample, SampleHistory, Severity, TouPeriod,
};
use building_energy_advisor::forecast::{backtest, ForecastError, Forecaster};
use building_energy_advisor::optimizer::Optimizer;
use chrono::Duration;
use common::office_history;

#[test]
fn forecast_requires_two_days() {
    let forecaster = Forecaster::default();
    let history = office_history(48);

    assert_eq!(
        forecaster.forecast(&history[..47]),
        Err(ForecastError::InsufficientHistory {
            required: 48,
            actual: 47
        })
    );
    let result = forecaster.forecast(&history).unwrap();
    assert!(result.next_period_demand_kwh >= 5.0);
    assert!(result.solar_available_kwh >= 0.0);
    assert!((0.65..=0.98).contains(&result.confidence));
}

#[test]
fn night_target_has_no_solar() {
    // 72 samples end at Wednesday 23:00, the target is midnight
    let result = Forecaster::default().forecast(&office_history(72)).unwrap();
    assert_eq!(result.solar_available_kwh, 0.0);
}

#[test]
fn backtest_on_regular_profile_is_usable() {
    let metrics = backtest(&Forecaster::default(), &office_history(96)).unwrap();
    assert_eq!(metrics.sample_count, 48);
    assert!(metrics.mape.is_finite());
    assert!(metrics.mae >= 0.0);
}

#[test]
fn dispatch_examples() {
    let optimizer = Optimizer::default();

    let peak = optimizer.optimize(50.0, 30.0, 0.12, 25.0, TouPeriod::Peak);
    assert_eq!(peak.solar_kwh, 30.0);
    assert_eq!(peak.battery_discharge_kwh, 20.0);
    assert_eq!(peak.grid_kwh, 0.0);
    assert_eq!(peak.cost, 0.0);

    let off_peak = optimizer.optimize(50.0, 10.0, 0.12, 25.0, TouPeriod::OffPeak);
    assert_eq!(off_peak.effective_price, 0.072);
    assert_eq!(off_peak.battery_discharge_kwh, 0.0);
    assert_eq!(off_peak.grid_kwh, 40.0);
    assert_eq!(off_peak.cost, 2.88);
}

#[test]
fn spike_is_flagged_high() {
    let mut history = office_history(24 * 7);
    let trailing: f64 = history[history.len() - 6..]
        .iter()
        .map(|s| s.consumption_kwh)
        .sum::<f64>()
        / 6.0;
    let mut spike = history[history.len() - 1].clone();
    spike.timestamp += Duration::hours(1);
    spike.consumption_kwh = 3.0 * trailing;
    history.push(spike);

    let records = AnomalyDetector::default().detect(&history);
    let last = records.last().unwrap();
    assert!(last.is_anomaly);
    assert_eq!(last.severity, Severity::High);
    assert_eq!(last.anomaly_type, Some(AnomalyType::Spike));
    assert!(last.confidence.unwrap() <= 0.98);
}

#[test]
fn window_size_controls_first_record() {
    let history = office_history(100);
    let detector = AnomalyDetector::new(AnomalyConfig {
        window_size: 72,
        ..AnomalyConfig::default()
    });
    let records = detector.detect(&history);
    assert_eq!(records.len(), 100 - 72);
    assert_eq!(records[0].timestamp, history[72].timestamp);
    assert_eq!(detector.detect_with_window(&history, 10).len(), 100 - 24);
}

#[test]
fn advisor_cycle_over_retention_window() {
    let mut retained = SampleHistory::new(24 * 5).unwrap();
    retained.extend(office_history(24 * 7)).unwrap();
    assert_eq!(retained.len(), 24 * 5);

    let stale = retained.as_slice()[0].clone();
    assert!(matches!(
        retained.push(stale),
        Err(HistoryError::OutOfOrder { .. })
    ));

    let mut advisor = EnergyAdvisor::from_config(&Config::default()).unwrap();
    let first = advisor.run_cycle(retained.as_slice()).unwrap();
    assert!((0.0..=100.0).contains(&first.battery_level_kwh));
    assert_eq!(first.summary.evaluated, 24 * 5 - 48);
    assert_eq!(first.anomalies.len(), first.summary.anomalies);

    let mut next = retained.latest().unwrap().clone();
    next.timestamp += Duration::hours(1);
    retained.push(next).unwrap();
    let second = advisor.run_cycle(retained.as_slice()).unwrap();
    assert_eq!(
        second.target_timestamp,
        first.target_timestamp + Duration::hours(1)
    );
}

#[test]
fn samples_parse_from_json() {
    let raw = r#"[
        {
            "timestamp": "2024-03-04T09:00:00+01:00",
            "consumption_kwh": 31.5,
            "temperature_c": 11.2,
            "irradiance_wm2": 180.0,
            "wind_speed_ms": 4.1,
            "occupancy_fraction": 0.75
        },
        {
            "timestamp": "2024-03-04T10:00:00+01:00",
            "consumption_kwh": 33.0,
            "temperature_c": 12.0,
            "irradiance_wm2": 260.0,
            "wind_speed_ms": 3.8,
            "occupancy_fraction": 0.8,
            "solar_generation_kwh": 4.2
        }
    ]"#;
    let samples: Vec<Sample> = serde_json::from_str(raw).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].hour(), 9);
    assert_eq!(samples[0].solar_generation_kwh, None);
    assert_eq!(samples[1].solar_generation_kwh, Some(4.2));
    assert!(samples[1].is_business_hours());
}

#[test]
fn reversed_history_is_rejected_not_forecast() {
    let mut samples = office_history(120);
    samples.reverse();

    let mut advisor = EnergyAdvisor::from_config(&Config::default()).unwrap();
    assert!(advisor.run_cycle(&samples).is_err());

    let mut retained = SampleHistory::new(samples.len()).unwrap();
    assert!(matches!(
        retained.extend(samples),
        Err(HistoryError::OutOfOrder { .. })
    ));
}
