use std::time::Duration;
use tokio::time::Instant;

use crate::device::Status;

use super::config::CadenceConfig;

/// Reporting bookkeeping owned by the poll loop.
///
/// `None` means "never", which is older than any interval. A fresh state
/// therefore always reports on the first poll and starts with the
/// post-burn window closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CadenceState {
    /// Last time an update was sent to the monitoring server
    pub last_update_sent_at: Option<Instant>,

    /// Last time the burner was seen firing
    pub last_active_at: Option<Instant>,
}

/// Why a poll was or was not reported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    /// The burner is firing or about to fire
    Active,
    /// The pump is running without the burner
    Circulating,
    /// Standby, and the standby interval elapsed since the last update
    StandbyHeartbeat,
    /// Standby, shortly after the burner stopped
    PostBurn,
    /// Standby, nothing worth reporting yet
    Throttled,
    /// The boiler reported a status we don't know about
    UnexpectedStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub report: bool,
    pub reason: Reason,
    /// Cadence state to use for the next poll
    pub cadence: CadenceState,
}

fn within(now: Instant, since: Option<Instant>, window: Duration) -> bool {
    since.is_some_and(|t| now.saturating_duration_since(t) <= window)
}

fn elapsed(now: Instant, since: Option<Instant>, interval: Duration) -> bool {
    since.is_none_or(|t| now.saturating_duration_since(t) >= interval)
}

/// Decide whether the poll observed at `now` should be reported.
pub fn decide(
    status: &Status,
    now: Instant,
    cadence: CadenceState,
    config: &CadenceConfig,
) -> Decision {
    let sent = CadenceState {
        last_update_sent_at: Some(now),
        ..cadence
    };

    match status {
        Status::Heating | Status::Purging | Status::Igniting | Status::Initializing => Decision {
            report: true,
            reason: Reason::Active,
            cadence: CadenceState {
                last_update_sent_at: Some(now),
                last_active_at: Some(now),
            },
        },
        // circulating alone does not count as a burn
        Status::Circulating => Decision {
            report: true,
            reason: Reason::Circulating,
            cadence: sent,
        },
        Status::Standby => {
            if elapsed(now, cadence.last_update_sent_at, config.standby_interval) {
                Decision {
                    report: true,
                    reason: Reason::StandbyHeartbeat,
                    cadence: sent,
                }
            } else if within(now, cadence.last_active_at, config.post_burn_window) {
                Decision {
                    report: true,
                    reason: Reason::PostBurn,
                    cadence: sent,
                }
            } else {
                Decision {
                    report: false,
                    reason: Reason::Throttled,
                    cadence,
                }
            }
        }
        Status::Unknown(_) => Decision {
            report: false,
            reason: Reason::UnexpectedStatus,
            cadence,
        },
    }
}
