use clap::Parser;
use std::num::ParseIntError;
use std::time::Duration;

use crate::remote::TemperatureUnit;
use crate::util::http::Uri;
use crate::util::types::Secret;

fn parse_duration(s: &str) -> Result<Duration, ParseIntError> {
    let millis: u64 = s.parse()?;
    Ok(Duration::from_millis(millis))
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)] // read from Cargo.toml
pub struct Cli {
    /// Boiler controller address, eg. "192.168.2.13"
    #[arg(env = "BOILERD_DEVICE_ADDRESS", long = "device-address", value_name = "host")]
    pub device_address: String,

    /// Monitoring server endpoint URI
    #[arg(
        env = "BOILERD_MONITOR_ENDPOINT",
        long = "monitor-endpoint",
        value_name = "uri"
    )]
    pub monitor_endpoint: Uri,

    /// Shared secret included in every update
    #[arg(
        env = "BOILERD_SECRET",
        long = "secret",
        value_name = "str",
        hide_env_values = true
    )]
    pub secret: Secret,

    /// Device poll interval in milliseconds
    #[arg(
        env = "BOILERD_POLL_INTERVAL_MS",
        long = "poll-interval-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub poll_interval: Option<Duration>,

    /// Time between updates while the boiler is in standby, in milliseconds
    #[arg(
        env = "BOILERD_STANDBY_INTERVAL_MS",
        long = "standby-interval-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub standby_interval: Option<Duration>,

    /// Time after the burner stops during which every poll is reported, in milliseconds
    #[arg(
        env = "BOILERD_POST_BURN_WINDOW_MS",
        long = "post-burn-window-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub post_burn_window: Option<Duration>,

    /// Device and monitoring request timeout in milliseconds
    #[arg(
        env = "BOILERD_REQUEST_TIMEOUT_MS",
        long = "request-timeout-ms",
        value_name = "ms",
        value_parser = parse_duration
    )]
    pub request_timeout: Option<Duration>,

    /// Unit temperatures are reported in, "celsius" or "fahrenheit"
    #[arg(
        env = "BOILERD_TEMPERATURE_UNIT",
        long = "temperature-unit",
        value_name = "unit",
        default_value_t = TemperatureUnit::Celsius
    )]
    pub temperature_unit: TemperatureUnit,
}

pub fn parse() -> Cli {
    Parser::parse()
}
