use tokio::time::Instant;
use tracing::{Span, debug, field, info, instrument, warn};

use crate::device::{DeviceClient, Reading};
use crate::remote::{MonitoringSink, report_reading};

use super::cadence::{CadenceState, Decision, Reason, decide};
use super::config::PollConfig;

/// Poll loop state: the device, the sink and the reporting cadence.
pub struct Scheduler<D, S> {
    device: D,
    sink: S,
    config: PollConfig,
    cadence: CadenceState,
}

impl<D, S> Scheduler<D, S>
where
    D: DeviceClient,
    S: MonitoringSink,
{
    pub fn new(device: D, sink: S, config: PollConfig) -> Self {
        Self {
            device,
            sink,
            config,
            cadence: CadenceState::default(),
        }
    }

    pub fn cadence(&self) -> CadenceState {
        self.cadence
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Poll the device once and report the reading if the cadence allows it.
    ///
    /// Returns `None` if the device could not be read, in which case the
    /// cadence is left untouched.
    #[instrument(name = "tick", skip_all, fields(status = field::Empty, report = field::Empty))]
    pub async fn tick(&mut self, now: Instant) -> Option<Decision> {
        debug!("updating boiler information");
        let reading = match self.device.refresh().await {
            Ok(reading) => reading,
            Err(e) => {
                warn!("failed to read boiler: {e}");
                return None;
            }
        };

        Span::current().record("status", field::display(&reading.status));
        let decision = decide(&reading.status, now, self.cadence, &self.config.cadence);
        Span::current().record("report", decision.report);
        self.cadence = decision.cadence;

        match decision.reason {
            Reason::Active => info!("sending update: boiler in active status"),
            Reason::Circulating => info!("sending update: boiler is circulating"),
            Reason::StandbyHeartbeat => info!("sending update: boiler in standby"),
            Reason::PostBurn => info!("sending update: boiler was recently active"),
            Reason::Throttled => debug!("boiler in standby, skipping update"),
            Reason::UnexpectedStatus => {
                warn!("boiler is in an unexpected state: {}", reading.status)
            }
        }

        if decision.report {
            self.report(&reading).await;
        }

        Some(decision)
    }

    async fn report(&self, reading: &Reading) {
        report_reading(&self.sink, reading).await;
    }

    /// Poll forever, waiting the configured interval after every poll
    pub async fn run(mut self) {
        loop {
            self.tick(Instant::now()).await;
            tokio::time::sleep(self.config.interval).await;
        }
    }
}

/// Start polling the device and reporting to the sink.
///
/// This never returns. Device and sink failures are logged and the loop
/// carries on with the next poll.
#[instrument(name = "poll", skip_all)]
pub async fn start_poll<D, S>(device: D, sink: S, config: PollConfig)
where
    D: DeviceClient,
    S: MonitoringSink,
{
    info!(
        "polling every {:?}, standby updates every {:?}",
        config.interval, config.cadence.standby_interval
    );
    Scheduler::new(device, sink, config).run().await
}
