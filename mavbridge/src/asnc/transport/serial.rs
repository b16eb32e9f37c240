use std::time::Duration;

use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Default timeout of serial port I/O operations.
pub const SERIAL_CONN_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial port transport configuration.
///
/// # Usage
///
/// ```rust,no_run
/// # #[tokio::main] async fn main() -> mavbridge::errors::Result<()> {
/// use mavbridge::asnc::{Bridge, SerialPort};
/// use mavbridge::core::BridgeConf;
///
/// let port = SerialPort::new("/dev/ttyAMA0", 921_600);
/// let bridge = Bridge::new(BridgeConf::default(), port.open().unwrap());
///
/// bridge.init().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialPort {
    path: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialPort {
    /// Instantiates a serial port configuration.
    ///
    /// Accepts as `path` anything that can be converted to a [String].
    /// Use `baud_rate` to set connection speed.
    pub fn new<'a>(path: impl Into<std::borrow::Cow<'a, str>>, baud_rate: u32) -> Self {
        Self {
            path: path.into().to_string(),
            baud_rate,
            timeout: SERIAL_CONN_TIMEOUT,
        }
    }

    /// Sets I/O timeout of the underlying port.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Device path.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Connection speed.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Opens serial port as an asynchronous stream.
    pub fn open(&self) -> tokio_serial::Result<SerialStream> {
        log::debug!("opening serial port {} at {} baud", self.path, self.baud_rate);
        tokio_serial::new(&self.path, self.baud_rate)
            .timeout(self.timeout)
            .open_native_async()
    }
}
