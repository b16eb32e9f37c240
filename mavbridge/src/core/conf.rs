//! Bridge configuration.

use std::time::Duration;

use crate::core::consts::{
    DEFAULT_ACK_TIMEOUT, DEFAULT_GUIDED_CUSTOM_MODE, DEFAULT_HEARTBEAT_INTERVAL,
    DEFAULT_STREAM_PORT, DEFAULT_STREAM_RATE, DEFAULT_WRITE_TIMEOUT,
};
use crate::core::PeerIdentity;

/// Bridge configuration.
///
/// Configuration can be obtained either from [`BridgeConf::default`] or through
/// [`BridgeConf::builder`]. Once built, configuration is immutable and is shared by all bridge
/// components as `Arc<BridgeConf>`. Use [`BridgeConf::update`] to derive a modified copy.
///
/// # Usage
///
/// ```rust
/// use std::time::Duration;
/// use mavbridge::core::{BridgeConf, PeerIdentity};
///
/// let conf = BridgeConf::builder()
///     .identity(PeerIdentity::new(1, 1, 191))
///     .ack_timeout(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(conf.identity().own_component_id(), 191);
/// assert_eq!(conf.ack_timeout(), Duration::from_secs(5));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConf {
    identity: PeerIdentity,
    write_timeout: Duration,
    ack_timeout: Duration,
    heartbeat_interval: Duration,
    stream_port: u8,
    stream_rate: f32,
    guided_custom_mode: u32,
}

impl BridgeConf {
    /// Creates a [`BridgeConfBuilder`] populated with defaults.
    pub fn builder() -> BridgeConfBuilder {
        BridgeConfBuilder {
            conf: BridgeConf::default(),
        }
    }

    /// Creates a [`BridgeConfBuilder`] initialised with current configuration.
    pub fn update(self) -> BridgeConfBuilder {
        BridgeConfBuilder { conf: self }
    }

    /// Identity of this process and the autopilot.
    #[inline(always)]
    pub fn identity(&self) -> &PeerIdentity {
        &self.identity
    }

    /// Deadline for a single encode + write.
    ///
    /// Default is [`DEFAULT_WRITE_TIMEOUT`].
    #[inline(always)]
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Deadline for a reply to a command.
    ///
    /// Default is [`DEFAULT_ACK_TIMEOUT`].
    #[inline(always)]
    pub fn ack_timeout(&self) -> Duration {
        self.ack_timeout
    }

    /// Interval between heartbeats of the supervised heartbeat loop.
    ///
    /// Default is [`DEFAULT_HEARTBEAT_INTERVAL`].
    #[inline(always)]
    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Telemetry port `n` of `SR<n>_*` parameters pinned during initialization.
    #[inline(always)]
    pub fn stream_port(&self) -> u8 {
        self.stream_port
    }

    /// Rate (Hz) telemetry streams are pinned to during initialization.
    #[inline(always)]
    pub fn stream_rate(&self) -> f32 {
        self.stream_rate
    }

    /// Autopilot custom mode number that corresponds to guided mode.
    #[inline(always)]
    pub fn guided_custom_mode(&self) -> u32 {
        self.guided_custom_mode
    }
}

impl Default for BridgeConf {
    fn default() -> Self {
        Self {
            identity: PeerIdentity::default(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            stream_port: DEFAULT_STREAM_PORT,
            stream_rate: DEFAULT_STREAM_RATE,
            guided_custom_mode: DEFAULT_GUIDED_CUSTOM_MODE,
        }
    }
}

/// Builder for [`BridgeConf`].
#[derive(Clone, Debug)]
pub struct BridgeConfBuilder {
    conf: BridgeConf,
}

impl BridgeConfBuilder {
    /// Set [`BridgeConf::identity`].
    pub fn identity(mut self, identity: PeerIdentity) -> Self {
        self.conf.identity = identity;
        self
    }

    /// Set [`BridgeConf::write_timeout`].
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.conf.write_timeout = timeout;
        self
    }

    /// Set [`BridgeConf::ack_timeout`].
    pub fn ack_timeout(mut self, timeout: Duration) -> Self {
        self.conf.ack_timeout = timeout;
        self
    }

    /// Set [`BridgeConf::heartbeat_interval`].
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.conf.heartbeat_interval = interval;
        self
    }

    /// Set [`BridgeConf::stream_port`].
    pub fn stream_port(mut self, port: u8) -> Self {
        self.conf.stream_port = port;
        self
    }

    /// Set [`BridgeConf::stream_rate`].
    pub fn stream_rate(mut self, rate: f32) -> Self {
        self.conf.stream_rate = rate;
        self
    }

    /// Set [`BridgeConf::guided_custom_mode`].
    pub fn guided_custom_mode(mut self, mode: u32) -> Self {
        self.conf.guided_custom_mode = mode;
        self
    }

    /// Builds immutable [`BridgeConf`].
    pub fn build(self) -> BridgeConf {
        self.conf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conf_defaults() {
        let conf = BridgeConf::default();

        assert_eq!(conf.identity().system_id(), 1);
        assert_eq!(conf.identity().component_id(), 1);
        assert_eq!(conf.identity().own_component_id(), 5);
        assert_eq!(conf.write_timeout(), DEFAULT_WRITE_TIMEOUT);
        assert_eq!(conf.ack_timeout(), DEFAULT_ACK_TIMEOUT);
        assert_eq!(conf.stream_port(), 0);
        assert_eq!(conf.stream_rate(), 0.0);
    }

    #[test]
    fn conf_update_workflow() {
        let conf = BridgeConf::builder()
            .stream_port(2)
            .write_timeout(Duration::from_millis(50))
            .build();

        let updated = conf.clone().update().stream_rate(4.0).build();

        assert_eq!(updated.stream_port(), 2);
        assert_eq!(updated.write_timeout(), Duration::from_millis(50));
        assert_eq!(updated.stream_rate(), 4.0);
        assert_ne!(conf, updated);
    }
}
