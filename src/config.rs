/// Sensor configuration loader - parses sensors.toml
///
/// Keeps the list of polled places and the service timings out of the code,
/// so a station can be added or switched to another upstream variant without
/// recompiling.
///
/// ```toml
/// [service]
/// poll_interval_minutes = 5
/// throttle_minutes = 5
///
/// [[sensor]]
/// name = "Balaton átlag"
/// source = "embedded_array"
/// ```

use crate::ingest::source::Source;
use crate::sensor::{DEFAULT_NAME, DEFAULT_THROTTLE_MINUTES, WaterLevelSensor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Used when neither `--config` nor `LAKELEVEL_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "sensors.toml";

/// Upper bound for every `*_minutes` setting (one year).
pub const MAX_MINUTES: u64 = 525_600;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Configuration structures
// ---------------------------------------------------------------------------

/// Root of sensors.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub service: ServiceSettings,

    #[serde(rename = "sensor", default)]
    pub sensors: Vec<SensorConfig>,
}

/// Timings and pool size. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// How often the daemon runs a poll cycle.
    pub poll_interval_minutes: u64,

    /// Minimum time between two fetches for the same sensor.
    pub throttle_minutes: u64,

    pub request_timeout_secs: u64,

    /// Worker threads used for one poll cycle.
    pub workers: usize,

    /// Age after which a reading is reported as stale.
    pub staleness_threshold_minutes: u64,
}

impl ServiceSettings {
    pub fn poll_interval(&self) -> chrono::Duration {
        minutes(self.poll_interval_minutes)
    }

    pub fn throttle(&self) -> chrono::Duration {
        minutes(self.throttle_minutes)
    }

    pub fn staleness_threshold(&self) -> chrono::Duration {
        minutes(self.staleness_threshold_minutes)
    }
}

// Clamped to MAX_MINUTES so an unvalidated value cannot overflow TimeDelta.
fn minutes(value: u64) -> chrono::Duration {
    chrono::Duration::minutes(value.min(MAX_MINUTES) as i64)
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            poll_interval_minutes: 5,
            throttle_minutes: DEFAULT_THROTTLE_MINUTES as u64,
            request_timeout_secs: 30,
            workers: 4,
            staleness_threshold_minutes: 60,
        }
    }
}

/// One `[[sensor]]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(flatten)]
    pub source: Source,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Reads, parses and validates a configuration file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ServiceConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate()?;
    Ok(config)
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[sensor]] must be configured".to_string(),
            ));
        }
        if self.service.poll_interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "service.poll_interval_minutes must be greater than zero".to_string(),
            ));
        }
        for (key, value) in [
            ("poll_interval_minutes", self.service.poll_interval_minutes),
            ("throttle_minutes", self.service.throttle_minutes),
            ("staleness_threshold_minutes", self.service.staleness_threshold_minutes),
        ] {
            if value > MAX_MINUTES {
                return Err(ConfigError::Invalid(format!(
                    "service.{} must be at most {} (got {})",
                    key, MAX_MINUTES, value
                )));
            }
        }
        if self.service.workers == 0 {
            return Err(ConfigError::Invalid(
                "service.workers must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for sensor in &self.sensors {
            if sensor.name.trim().is_empty() {
                return Err(ConfigError::Invalid("sensor name must not be empty".to_string()));
            }
            if !seen.insert(sensor.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "sensor '{}' is configured more than once",
                    sensor.name
                )));
            }
        }

        Ok(())
    }

    /// Builds one sensor per `[[sensor]]` table, in file order.
    pub fn build_sensors(&self) -> Vec<WaterLevelSensor> {
        let throttle = self.service.throttle();
        self.sensors
            .iter()
            .map(|s| WaterLevelSensor::with_throttle(s.name.clone(), s.source.clone(), throttle))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
