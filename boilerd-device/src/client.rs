use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{Span, debug, field, instrument, warn};

use crate::models::Reading;
use crate::util::http::{InvalidUriError, Uri};
use crate::util::json::{deserialize_duration_from_ms, serialize_duration_to_ms};

/// CGI endpoint serving the controller data objects
pub const TARGET_PATH: &str = "/cgi-bin/bc2-cgi";

/// Minimum time between two requests to the controller.
///
/// The controller is a small embedded device, callers must not query it
/// more often than this.
pub const MINIMUM_DELAY: Duration = Duration::from_secs(9);

// IMPORTANT: object number 100 is the read container for every data
// object. Any other object number tells the controller to *write* the
// values passed in the query.
const READ_CONTAINER: u16 = 100;

/// Data objects that can be requested from the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectCode {
    /// Extended boiler detail: status, temperatures, output and pressures
    BoilerExtDetail,
}

impl ObjectCode {
    pub fn code(self) -> u16 {
        match self {
            ObjectCode::BoilerExtDetail => 19,
        }
    }
}

#[derive(Serialize, Debug)]
struct ObjectRequest {
    object_no: u16,
    object_request: u16,
    boiler_no: u16,
}

impl From<ObjectCode> for ObjectRequest {
    fn from(object: ObjectCode) -> Self {
        Self {
            object_no: READ_CONTAINER,
            object_request: object.code(),
            boiler_no: 0,
        }
    }
}

/// Errors that can occur while querying the controller.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The request could not be sent or timed out
    #[error("request failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// The controller answered with a non-success status
    #[error("device responded with status code {0}")]
    Status(StatusCode),

    /// The response body is not a valid detail object
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Boiler controller configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Controller base address, e.g. `http://192.168.2.13/`
    pub address: Uri,

    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub timeout: Duration,

    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        serialize_with = "serialize_duration_to_ms"
    )]
    pub min_interval: Duration,
}

impl DeviceConfig {
    pub fn new(address: Uri) -> Self {
        Self {
            address,
            timeout: Duration::from_millis(5_000),
            min_interval: MINIMUM_DELAY,
        }
    }
}

/// Source of boiler readings.
///
/// The scheduler only depends on this trait so it can be driven without a
/// real controller.
#[async_trait]
pub trait DeviceClient: Send {
    /// Query the device once and return the decoded reading
    async fn refresh(&mut self) -> Result<Reading, DeviceError>;
}

/// HTTP client for an IBC boiler controller.
pub struct IbcBoiler {
    client: reqwest::Client,
    endpoint: String,
    config: DeviceConfig,
    last_request: Option<Instant>,
    reading: Option<Reading>,
}

impl IbcBoiler {
    pub fn new(config: DeviceConfig) -> Result<Self, InvalidUriError> {
        let endpoint = Uri::from_parts(config.address.clone(), TARGET_PATH, None)?.to_string();

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            config,
            last_request: None,
            reading: None,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Last successfully decoded reading, if any
    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    /// Time the last request was sent to the controller
    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }

    #[instrument(skip_all, fields(object = object.code(), status = field::Empty))]
    async fn request_object(&mut self, object: ObjectCode) -> Result<Reading, DeviceError> {
        let now = Instant::now();
        if let Some(last) = self.last_request
            && now.duration_since(last) < self.config.min_interval
        {
            warn!(
                "querying device {:?} after the previous request, minimum is {:?}",
                now.duration_since(last),
                self.config.min_interval
            );
        }
        self.last_request = Some(now);

        // the controller expects the request object as a JSON string in the query
        let payload = serde_json::to_string(&ObjectRequest::from(object))?;
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("json", payload)])
            .timeout(self.config.timeout)
            .send()
            .await?;

        debug!("{}", response.url());
        let status = response.status();
        Span::current().record("status", status.as_u16());
        if !status.is_success() {
            return Err(DeviceError::Status(status));
        }

        let body = response.bytes().await?;
        let reading = Reading::from_slice(&body)?;
        Ok(reading)
    }
}

#[async_trait]
impl DeviceClient for IbcBoiler {
    async fn refresh(&mut self) -> Result<Reading, DeviceError> {
        let reading = self.request_object(ObjectCode::BoilerExtDetail).await?;
        self.reading = Some(reading.clone());
        Ok(reading)
    }
}
