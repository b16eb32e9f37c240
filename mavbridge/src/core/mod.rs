//! # Core bridge entities
//!
//! Configuration, identity, channel registry and vehicle state shared by all bridge components.

mod channel;
mod conf;
pub mod consts;
mod identity;
mod vehicle;

pub use channel::{Channel, CHANNEL_COUNT};
pub use conf::{BridgeConf, BridgeConfBuilder};
pub use identity::PeerIdentity;
pub use vehicle::{VehicleCommand, VehicleState};
