pub mod advisor;
pub mod anomaly;
pub mod config;
pub mod domain;
pub mod forecast;
pub mod optimizer;
pub mod telemetry;
pub mod utils;
