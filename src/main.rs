use anyhow::{Context, Result};
use building_energy_advisor::{advisor, config, domain, telemetry};
use advisor::EnergyAdvisor;
use clap::Parser;
use config::{Config, DEFAULT_CONFIG_PATH};
use domain::{Sample, SampleHistory};
use std::path::PathBuf;
use telemetry::init_tracing;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "energy-advisor")]
#[command(version, about = "Forecast, dispatch and anomaly report for one building")]
struct Args {
    /// JSON array of hourly samples, oldest first
    history: PathBuf,

    /// TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing();

    let cfg = Config::load(&args.config)?;

    let raw = std::fs::read_to_string(&args.history)
        .with_context(|| format!("failed to read {}", args.history.display()))?;
    let samples: Vec<Sample> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse samples from {}", args.history.display()))?;

    let loaded = samples.len();
    let mut history = SampleHistory::new(cfg.history.capacity)?;
    history
        .extend(samples)
        .with_context(|| format!("samples in {} are not in timestamp order", args.history.display()))?;
    if history.len() < loaded {
        warn!(loaded, retained = history.len(), "older samples dropped by the retention window");
    }
    info!(samples = history.len(), path = %args.history.display(), "history loaded");

    let mut advisor = EnergyAdvisor::from_config(&cfg)?;
    let report = advisor.run_cycle(history.as_slice())?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_config() {
        let args = Args::try_parse_from(["energy-advisor", "week.json"]).unwrap();
        assert_eq!(args.history, PathBuf::from("week.json"));
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_args_config_flag() {
        let args =
            Args::try_parse_from(["energy-advisor", "--config", "site.toml", "week.json"]).unwrap();
        assert_eq!(args.config, PathBuf::from("site.toml"));
        assert!(Args::try_parse_from(["energy-advisor"]).is_err());
        assert!(Args::try_parse_from(["energy-advisor", "a.json", "b.json"]).is_err());
    }
}
