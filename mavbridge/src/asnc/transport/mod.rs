//! # Transports
//!
//! Any [`tokio::io::AsyncRead`] + [`tokio::io::AsyncWrite`] stream can serve as a bridge
//! transport. Serial ports are supported out of the box when `serial` feature is enabled.

#[cfg(feature = "serial")]
mod serial;

#[cfg(feature = "serial")]
pub use serial::{SerialPort, SERIAL_CONN_TIMEOUT};
