/*
Read-only client for the local HTTP interface of an IBC boiler controller.

The controller exposes its data as numbered objects behind a single CGI
endpoint. Only the extended boiler detail object is supported here, it
carries the operating status and the sensor values needed for monitoring.
*/

mod client;
mod models;

pub use client::{
    DeviceClient, DeviceConfig, DeviceError, IbcBoiler, MINIMUM_DELAY, ObjectCode, TARGET_PATH,
};
pub use models::{Reading, Status, UNSET_SENTINEL};

use boilerd_util as util;
