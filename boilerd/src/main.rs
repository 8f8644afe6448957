use std::error::Error;

use tracing::{info, instrument, trace};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod cli;

use boilerd_device as device;
use boilerd_remote as remote;
use boilerd_state as state;
use boilerd_util as util;

use crate::cli::Cli;
use crate::device::{DeviceConfig, IbcBoiler};
use crate::remote::{HttpSink, RemoteConfig};
use crate::state::{CadenceConfig, PollConfig};
use crate::util::http::Uri;

fn initialize_tracing() {
    // Initialize tracing subscriber for human-readable logs
    tracing_subscriber::registry()
        .with(
            // Use some log defaults. These can be overriden using
            // RUST_LOG
            EnvFilter::try_from_default_env().unwrap_or(
                EnvFilter::default()
                    .add_directive("debug".parse().unwrap())
                    .add_directive("hyper=error".parse().unwrap())
                    .add_directive("hyper_util=error".parse().unwrap())
                    .add_directive("reqwest=info".parse().unwrap()),
            ),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .event_format(fmt::format().compact().with_target(false)),
        )
        .init();
}

fn device_config(cli: &Cli) -> Result<DeviceConfig, Box<dyn Error>> {
    let address = Uri::from_authority(&cli.device_address)?;
    let defaults = DeviceConfig::new(address);
    Ok(DeviceConfig {
        timeout: cli.request_timeout.unwrap_or(defaults.timeout),
        ..defaults
    })
}

fn remote_config(cli: &Cli) -> RemoteConfig {
    let defaults = RemoteConfig::new(cli.monitor_endpoint.clone(), cli.secret.clone());
    RemoteConfig {
        timeout: cli.request_timeout.unwrap_or(defaults.timeout),
        temperature_unit: cli.temperature_unit,
        ..defaults
    }
}

fn poll_config(cli: &Cli) -> PollConfig {
    let defaults = PollConfig::default();
    PollConfig {
        interval: cli.poll_interval.unwrap_or(defaults.interval),
        cadence: CadenceConfig {
            standby_interval: cli
                .standby_interval
                .unwrap_or(defaults.cadence.standby_interval),
            post_burn_window: cli
                .post_burn_window
                .unwrap_or(defaults.cadence.post_burn_window),
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    initialize_tracing();

    let cli = cli::parse();

    let device_config = device_config(&cli)?;
    let remote_config = remote_config(&cli);
    let poll_config = poll_config(&cli);
    poll_config.validate(device_config.min_interval)?;

    start_monitor(device_config, remote_config, poll_config).await
}

#[instrument(name = "boilerd", skip_all, err)]
async fn start_monitor(
    device_config: DeviceConfig,
    remote_config: RemoteConfig,
    poll_config: PollConfig,
) -> Result<(), Box<dyn Error>> {
    trace!(
        device = ?device_config,
        remote = ?remote_config,
        poll = ?poll_config,
        "using config:"
    );

    let boiler = IbcBoiler::new(device_config)?;
    let sink = HttpSink::new(&remote_config);
    info!(
        "reading boiler at {}, reporting to {}",
        boiler.endpoint(),
        remote_config.endpoint
    );

    // Poll until terminated
    tokio::select! {
        _ = state::start_poll(boiler, sink, poll_config) => Ok(()),
        res = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            res.map_err(|err| err.into())
        }
    }
}
