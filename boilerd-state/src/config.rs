use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::util::json::{deserialize_duration_from_ms, serialize_duration_to_ms};

/// Reporting cadence configuration
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CadenceConfig {
    /// Time between updates while the boiler is in standby
    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub standby_interval: Duration,

    /// Time after the burner stops during which every poll is still reported
    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub post_burn_window: Duration,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            standby_interval: Duration::from_millis(300_000),
            post_burn_window: Duration::from_millis(120_000),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PollConfig {
    /// Time to wait after each poll before the next one
    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub interval: Duration,

    pub cadence: CadenceConfig,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10_000),
            cadence: CadenceConfig::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval of {interval:?} is shorter than the device minimum of {minimum:?}")]
    IntervalTooShort {
        interval: Duration,
        minimum: Duration,
    },
}

impl PollConfig {
    /// Check the poll interval keeps requests at least `device_min_interval` apart
    pub fn validate(&self, device_min_interval: Duration) -> Result<(), ConfigError> {
        if self.interval < device_min_interval {
            return Err(ConfigError::IntervalTooShort {
                interval: self.interval,
                minimum: device_min_interval,
            });
        }
        Ok(())
    }
}
