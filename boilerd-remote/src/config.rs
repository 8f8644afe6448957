use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::util::http::Uri;
use crate::util::json::{deserialize_duration_from_ms, serialize_duration_to_ms};
use crate::util::types::Secret;

/// Unit temperatures are reported in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius value to this unit
    pub fn convert_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 1.8 + 32.0,
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown temperature unit '{0}', expected 'celsius' or 'fahrenheit'")]
pub struct InvalidUnitError(String);

impl FromStr for TemperatureUnit {
    type Err = InvalidUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(InvalidUnitError(s.to_owned())),
        }
    }
}

impl Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureUnit::Celsius => f.write_str("celsius"),
            TemperatureUnit::Fahrenheit => f.write_str("fahrenheit"),
        }
    }
}

/// Monitoring server configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RemoteConfig {
    pub endpoint: Uri,
    pub secret: Secret,

    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub timeout: Duration,

    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

impl RemoteConfig {
    pub fn new(endpoint: Uri, secret: Secret) -> Self {
        Self {
            endpoint,
            secret,
            timeout: Duration::from_millis(5_000),
            temperature_unit: TemperatureUnit::default(),
        }
    }
}
