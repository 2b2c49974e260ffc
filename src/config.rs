use std::time::Duration;

use thiserror::Error;

use crate::scoring::{sweep_task::SweepConfig, PointSchedule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number of {unit}, got {value:?}")]
    InvalidNumber {
        name: &'static str,
        unit: &'static str,
        value: String,
    },

    #[error("Cannot read point schedule {path}: {source}")]
    ScheduleFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid point schedule {path}: {source}")]
    ScheduleFormat {
        path: String,
        source: serde_json::Error,
    },
}

/// Server configuration, read from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// In-memory repositories are used when unset
    pub database_url: Option<String>,
    pub sweep: SweepConfig,
    pub point_schedule: PointSchedule,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = SweepConfig::default();

        let sweep_interval = match lookup("SWEEP_INTERVAL_SECS") {
            Some(value) => Duration::from_secs(parse_positive("SWEEP_INTERVAL_SECS", "seconds", value)?),
            None => defaults.sweep_interval,
        };
        let settle_delay = match lookup("RESULTS_SETTLE_HOURS") {
            Some(value) => {
                Duration::from_secs(parse_positive("RESULTS_SETTLE_HOURS", "hours", value)? * 60 * 60)
            }
            None => defaults.settle_delay,
        };

        let point_schedule = match lookup("POINT_SCHEDULE_FILE") {
            Some(path) => load_point_schedule(&path)?,
            None => PointSchedule::default(),
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            sweep: SweepConfig {
                sweep_interval,
                settle_delay,
            },
            point_schedule,
        })
    }
}

fn parse_positive(name: &'static str, unit: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber { name, unit, value }),
    }
}

/// Reads a JSON point schedule. Fields left out keep their standard value.
pub fn load_point_schedule(path: &str) -> Result<PointSchedule, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ScheduleFile {
        path: path.to_string(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| ConfigError::ScheduleFormat {
        path: path.to_string(),
        source,
    })
}
