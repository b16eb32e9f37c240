//! # Mavbridge
//!
//! A host-side [MAVLink](https://mavlink.io/en/) bridge between a companion computer and a flight
//! controller. Mavbridge takes care of the message exchange that a companion computer needs to
//! fly a vehicle in guided mode: telemetry stream configuration and autopilot reboot at startup,
//! periodic heartbeats, position targets, and arming and mode changes confirmed by the autopilot.
//!
//! Mavbridge is built on top of [Mavio](https://gitlab.com/mavka/libs/mavio) which handles MAVLink
//! wire format.
//!
//! # Usage
//!
//! ```rust,no_run
//! # #[cfg(not(feature = "serial"))] fn main() {}
//! # #[cfg(feature = "serial")]
//! # #[tokio::main] async fn main() -> mavbridge::errors::Result<()> {
//! use mavbridge::prelude::*;
//!
//! let port = SerialPort::new("/dev/ttyAMA0", 921_600);
//! let bridge = Bridge::new(BridgeConf::default(), port.open().unwrap());
//!
//! // Pin telemetry streams and reboot the autopilot
//! bridge.init().await?;
//!
//! // Keep guided-mode link alive
//! let heartbeats = bridge.spawn_heartbeat_loop(bridge.conf().heartbeat_interval())?;
//!
//! bridge.arm().await?;
//! bridge.set_guided_mode().await?;
//! bridge.set_target_position_local([2.0, 0.0, 0.0]).await?;
//!
//! bridge.shutdown();
//! if let Some(err) = heartbeats.stopped().await {
//!     eprintln!("heartbeats failed: {err}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! In most of the cases you will be interested in `serial` feature flag, which is enabled by
//! default.
//!
#![doc = document_features::document_features!()]
//
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod asnc;
pub mod core;
pub mod errors;
pub mod prelude;
pub mod protocol;

#[cfg(test)]
pub(crate) mod test_utils;

#[doc(inline = true)]
pub extern crate mavio;

#[doc(inline = true)]
pub use mavio::dialects;
