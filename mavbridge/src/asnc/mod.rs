//! # Asynchronous bridge
//!
//! [`Bridge`] drives the autopilot link over a `tokio` transport. All suspending operations are
//! bounded by deadlines from [`BridgeConf`](crate::core::BridgeConf) and are interrupted when the
//! bridge is shut down.

mod bridge;
mod commander;
mod heartbeat;
pub(crate) mod link;
mod sequencer;
mod transport;
mod vehicle;

pub use bridge::Bridge;
pub use heartbeat::HeartbeatHandle;
#[cfg(feature = "serial")]
pub use transport::{SerialPort, SERIAL_CONN_TIMEOUT};
