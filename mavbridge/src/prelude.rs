//! # Basic imports

pub use crate::asnc::{Bridge, HeartbeatHandle};
pub use crate::core::{BridgeConf, Channel, PeerIdentity, VehicleState};
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::protocol::GlobalPosition;

#[cfg(feature = "serial")]
pub use crate::asnc::SerialPort;
