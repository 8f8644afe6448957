use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Raw value the controller reports for a sensor that is not connected.
pub const UNSET_SENTINEL: i64 = 32766;

// The controller stores temperatures as 4x the Celsius value
const TEMPERATURE_SCALE: f64 = 4.0;

/// Boiler operating status as reported by the controller.
///
/// Status strings not known to this crate are kept verbatim in `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Heating,
    Circulating,
    Standby,
    Purging,
    Igniting,
    Initializing,
    Unknown(String),
}

impl Status {
    /// True while the burner is firing or about to fire.
    pub fn is_firing(&self) -> bool {
        matches!(
            self,
            Status::Heating | Status::Purging | Status::Igniting | Status::Initializing
        )
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        match value {
            "Heating" => Status::Heating,
            "Circulating" => Status::Circulating,
            "Standby" => Status::Standby,
            "Purging" => Status::Purging,
            "Igniting" => Status::Igniting,
            "Initializing" => Status::Initializing,
            other => Status::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Status::from(value.as_str())
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.to_string()
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Heating => "Heating",
            Status::Circulating => "Circulating",
            Status::Standby => "Standby",
            Status::Purging => "Purging",
            Status::Igniting => "Igniting",
            Status::Initializing => "Initializing",
            Status::Unknown(raw) => raw.as_str(),
        };
        f.write_str(name)
    }
}

/// Payload of the extended boiler detail object, as sent by the controller.
///
/// Only the fields used for monitoring are decoded, everything else in the
/// response is ignored. Values are read as floats so a sensor sent with a
/// fractional part still decodes.
#[derive(Deserialize, Debug)]
struct ExtDetail {
    #[serde(rename = "Status")]
    status: Option<String>,
    #[serde(rename = "MBH")]
    mbh: Option<f64>,
    #[serde(rename = "SupplyT")]
    supply_t: Option<f64>,
    #[serde(rename = "ReturnT")]
    return_t: Option<f64>,
    #[serde(rename = "TargetT")]
    target_t: Option<f64>,
    #[serde(rename = "InletPressure")]
    inlet_pressure: Option<f64>,
    #[serde(rename = "DeltaPressure")]
    delta_pressure: Option<f64>,
}

/// Snapshot of one poll of the boiler.
///
/// Temperatures are in degrees Celsius. Sensors that are disconnected, or
/// missing from the response, are `None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reading {
    pub status: Status,
    pub supply_temperature: Option<f64>,
    pub return_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub output_capacity: Option<f64>,
    pub inlet_pressure: Option<f64>,
    pub delta_pressure: Option<f64>,
}

/// Drop the sentinel before anything else touches the value
fn sensor(raw: Option<f64>) -> Option<f64> {
    raw.filter(|value| *value != UNSET_SENTINEL as f64)
}

pub fn decode_temperature(raw: Option<f64>) -> Option<f64> {
    sensor(raw).map(|value| value / TEMPERATURE_SCALE)
}

pub fn decode_value(raw: Option<f64>) -> Option<f64> {
    sensor(raw)
}

impl ExtDetail {
    fn into_reading(self) -> Reading {
        Reading {
            status: self
                .status
                .map(Status::from)
                .unwrap_or_else(|| Status::Unknown("Unknown".to_owned())),
            supply_temperature: decode_temperature(self.supply_t),
            return_temperature: decode_temperature(self.return_t),
            target_temperature: decode_temperature(self.target_t),
            output_capacity: decode_value(self.mbh),
            inlet_pressure: decode_value(self.inlet_pressure),
            delta_pressure: decode_value(self.delta_pressure),
        }
    }
}

impl Reading {
    /// Decode a raw controller response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let detail: ExtDetail = serde_json::from_slice(body)?;
        Ok(detail.into_reading())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encode_temperature(celsius: f64) -> f64 {
        (celsius * TEMPERATURE_SCALE).round()
    }

    fn reading_from(value: serde_json::Value) -> Reading {
        Reading::from_slice(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_scales_temperatures_down() {
        assert_eq!(decode_temperature(Some(284.0)), Some(71.0));
        assert_eq!(decode_temperature(Some(-6.0)), Some(-1.5));
        assert_eq!(decode_temperature(Some(0.0)), Some(0.0));
    }

    #[test]
    fn test_treats_the_sentinel_as_absent() {
        assert_eq!(decode_temperature(Some(UNSET_SENTINEL as f64)), None);
        assert_eq!(decode_value(Some(UNSET_SENTINEL as f64)), None);
    }

    #[test]
    fn test_round_trips_raw_temperatures() {
        for raw in (-400..2000).chain(UNSET_SENTINEL - 10..UNSET_SENTINEL) {
            let raw = raw as f64;
            let decoded = decode_temperature(Some(raw)).unwrap();
            assert_eq!(encode_temperature(decoded), raw);
        }
    }

    #[test]
    fn test_decodes_a_full_detail_response() {
        let reading = reading_from(json!({
            "Status": "Heating",
            "MBH": 85,
            "SupplyT": 284,
            "ReturnT": 240,
            "TargetT": 320,
            "InletPressure": 32766,
            "DeltaPressure": 12,
            "FlameSignal": 7,
        }));

        assert_eq!(
            reading,
            Reading {
                status: Status::Heating,
                supply_temperature: Some(71.0),
                return_temperature: Some(60.0),
                target_temperature: Some(80.0),
                output_capacity: Some(85.0),
                inlet_pressure: None,
                delta_pressure: Some(12.0),
            }
        );
    }

    #[test]
    fn test_reports_missing_fields_as_absent() {
        let reading = reading_from(json!({ "SupplyT": 32766 }));

        assert_eq!(reading.status, Status::Unknown("Unknown".to_owned()));
        assert_eq!(reading.supply_temperature, None);
        assert_eq!(reading.return_temperature, None);
        assert_eq!(reading.output_capacity, None);
    }

    #[test]
    fn test_decodes_fractional_sensor_values() {
        let reading = reading_from(json!({
            "Status": "Heating",
            "SupplyT": 284,
            "InletPressure": 12.5,
            "DeltaPressure": 0.75,
        }));

        assert_eq!(reading.status, Status::Heating);
        assert_eq!(reading.supply_temperature, Some(71.0));
        assert_eq!(reading.inlet_pressure, Some(12.5));
        assert_eq!(reading.delta_pressure, Some(0.75));
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        assert!(Reading::from_slice(b"<html>busy</html>").is_err());
        assert!(Reading::from_slice(br#"{"SupplyT": "hot"}"#).is_err());
    }

    #[test]
    fn test_keeps_unrecognized_status_strings() {
        assert_eq!(Status::from("Lockout"), Status::Unknown("Lockout".to_owned()));
        assert_eq!(Status::from("Lockout").to_string(), "Lockout");
        assert_eq!(Status::from("Standby"), Status::Standby);
    }

    #[test]
    fn test_knows_which_statuses_are_firing() {
        for status in [
            Status::Heating,
            Status::Purging,
            Status::Igniting,
            Status::Initializing,
        ] {
            assert!(status.is_firing(), "{status} should be firing");
        }
        assert!(!Status::Circulating.is_firing());
        assert!(!Status::Standby.is_firing());
        assert!(!Status::Unknown("Off".to_owned()).is_firing());
    }
}
