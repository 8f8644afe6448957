/*
Boiler polling and reporting.

The boiler is queried on a fixed tick. Whether a reading is forwarded to
the monitoring server depends on the boiler status and on how long ago
the last update was sent, see `cadence::decide`.
*/

mod cadence;
mod config;
mod poll;

pub use cadence::{CadenceState, Decision, Reason, decide};
pub use config::{CadenceConfig, ConfigError, PollConfig};
pub use poll::{Scheduler, start_poll};

use boilerd_device as device;
use boilerd_remote as remote;
use boilerd_util as util;
