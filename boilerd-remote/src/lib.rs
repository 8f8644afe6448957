/*
This module is home to everything related to the remote monitoring server
the boiler readings are forwarded to.

Delivery is best effort. Failures are logged and the record is dropped,
the caller is never told about them.
*/

mod config;
mod report;

pub use config::{InvalidUnitError, RemoteConfig, TemperatureUnit};
pub use report::{HttpSink, MonitoringSink, Record, TemperatureKind, report_reading};

use boilerd_device as device;
use boilerd_util as util;
