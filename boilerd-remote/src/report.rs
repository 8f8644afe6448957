use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{Span, error, field, instrument, trace, warn};

use crate::device::Reading;
use crate::util::types::Secret;

use super::config::{RemoteConfig, TemperatureUnit};

/// Sensor name the monitoring server files the readings under
const SENSOR_NAME: &str = "IBCBoiler";

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureKind {
    Supply,
    Return,
    Target,
}

/// A single value reported to the monitoring server
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum Record {
    #[serde(rename = "boiler_temperature")]
    Temperature { subtype: TemperatureKind, value: f64 },

    #[serde(rename = "mbh")]
    Mbh { value: f64 },
}

#[derive(Serialize, Debug)]
struct Payload<'a> {
    sensor: &'static str,
    secret: &'a str,
    #[serde(flatten)]
    record: &'a Record,
}

/// Destination for boiler records.
///
/// Sending never fails from the caller's point of view, a record that
/// cannot be delivered is lost.
#[async_trait]
pub trait MonitoringSink: Send + Sync {
    async fn send(&self, record: Record);
}

/// Monitoring sink posting each record as JSON to the monitoring server
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
    secret: Secret,
    timeout: Duration,
    unit: TemperatureUnit,
}

impl HttpSink {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.to_string(),
            secret: config.secret.clone(),
            timeout: config.timeout,
            unit: config.temperature_unit,
        }
    }
}

#[async_trait]
impl MonitoringSink for HttpSink {
    #[instrument(skip_all, fields(status = field::Empty))]
    async fn send(&self, record: Record) {
        // readings are kept in Celsius up to the wire
        let record = match record {
            Record::Temperature { subtype, value } => Record::Temperature {
                subtype,
                value: self.unit.convert_celsius(value),
            },
            other => other,
        };
        let payload = Payload {
            sensor: SENSOR_NAME,
            secret: self.secret.as_str(),
            record: &record,
        };

        let response = match self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("failed to send update to the server: {e}");
                return;
            }
        };

        let status = response.status();
        Span::current().record("status", status.as_u16());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("server error {status}: {body}");
            return;
        }

        trace!("sent {record:?}");
    }
}

/// Send every available value of `reading` to the sink.
///
/// Values are sent in order supply, return and target temperature (in
/// Celsius), then output capacity. Absent values are skipped.
pub async fn report_reading<S>(sink: &S, reading: &Reading)
where
    S: MonitoringSink + ?Sized,
{
    let temperatures = [
        (TemperatureKind::Supply, reading.supply_temperature),
        (TemperatureKind::Return, reading.return_temperature),
        (TemperatureKind::Target, reading.target_temperature),
    ];

    for (subtype, value) in temperatures {
        if let Some(value) = value {
            sink.send(Record::Temperature { subtype, value }).await;
        }
    }

    if let Some(value) = reading.output_capacity {
        sink.send(Record::Mbh { value }).await;
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Mutex;

    use super::*;
    use crate::device::Status;
    use crate::util::http::Uri;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<Record>>);

    #[async_trait]
    impl MonitoringSink for RecordingSink {
        async fn send(&self, record: Record) {
            self.0.lock().unwrap().push(record);
        }
    }

    fn test_config(endpoint: String) -> RemoteConfig {
        RemoteConfig {
            timeout: Duration::from_secs(2),
            ..RemoteConfig::new(endpoint.parse().unwrap(), Secret::from("s3cr3t"))
        }
    }

    fn reading() -> Reading {
        Reading {
            status: Status::Heating,
            supply_temperature: Some(71.0),
            return_temperature: None,
            target_temperature: Some(80.0),
            output_capacity: Some(85.0),
            inlet_pressure: Some(30.0),
            delta_pressure: None,
        }
    }

    #[test]
    fn test_serializes_temperature_payloads_with_subtype() {
        let record = Record::Temperature {
            subtype: TemperatureKind::Supply,
            value: 71.0,
        };
        let payload = Payload {
            sensor: SENSOR_NAME,
            secret: "s3cr3t",
            record: &record,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "sensor": "IBCBoiler",
                "secret": "s3cr3t",
                "type": "boiler_temperature",
                "subtype": "supply",
                "value": 71.0,
            })
        );
    }

    #[test]
    fn test_serializes_mbh_payloads_without_subtype() {
        let record = Record::Mbh { value: 85.0 };
        let payload = Payload {
            sensor: SENSOR_NAME,
            secret: "s3cr3t",
            record: &record,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "sensor": "IBCBoiler",
                "secret": "s3cr3t",
                "type": "mbh",
                "value": 85.0,
            })
        );
    }

    #[tokio::test]
    async fn test_reports_available_values_in_order() {
        let sink = RecordingSink::default();
        report_reading(&sink, &reading()).await;

        assert_eq!(
            *sink.0.lock().unwrap(),
            vec![
                Record::Temperature {
                    subtype: TemperatureKind::Supply,
                    value: 71.0
                },
                Record::Temperature {
                    subtype: TemperatureKind::Target,
                    value: 80.0
                },
                Record::Mbh { value: 85.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_converts_temperatures_but_not_mbh() {
        let mut server = Server::new_async().await;
        let temperature = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "type": "boiler_temperature",
                "subtype": "supply",
                "value": 212.0,
            })))
            .with_status(200)
            .create_async()
            .await;
        let mbh = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "type": "mbh",
                "value": 85.0,
            })))
            .with_status(200)
            .create_async()
            .await;

        let config = RemoteConfig {
            temperature_unit: TemperatureUnit::Fahrenheit,
            ..test_config(server.url())
        };
        let sink = HttpSink::new(&config);
        let reading = Reading {
            supply_temperature: Some(100.0),
            target_temperature: None,
            ..reading()
        };
        report_reading(&sink, &reading).await;

        temperature.assert_async().await;
        mbh.assert_async().await;
    }

    #[tokio::test]
    async fn test_posts_records_to_the_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/sensor")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "sensor": "IBCBoiler",
                "secret": "s3cr3t",
                "type": "boiler_temperature",
                "subtype": "return",
                "value": 60.5,
            })))
            .with_status(200)
            .create_async()
            .await;

        let sink = HttpSink::new(&test_config(format!("{}/sensor", server.url())));
        sink.send(Record::Temperature {
            subtype: TemperatureKind::Return,
            value: 60.5,
        })
        .await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sends_one_request_per_value() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .expect(3)
            .create_async()
            .await;

        let sink = HttpSink::new(&test_config(server.url()));
        report_reading(&sink, &reading()).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_swallows_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_body("database is down")
            .expect(1)
            .create_async()
            .await;

        let sink = HttpSink::new(&test_config(server.url()));
        sink.send(Record::Mbh { value: 10.0 }).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_swallows_connection_errors() {
        let config = RemoteConfig::new(
            Uri::from_static("http://127.0.0.1:9/"),
            Secret::from("s3cr3t"),
        );
        let sink = HttpSink::new(&config);

        // must return without panicking
        sink.send(Record::Mbh { value: 10.0 }).await;
    }
}
