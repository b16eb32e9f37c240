//! # Frame codec
//!
//! The bridge never touches wire bytes directly. Outgoing commands go through a [`FrameEncoder`],
//! incoming bytes are fed into a [`FrameDecoder`]. Both are pluggable, the default implementation
//! is backed by [`mavio`] and is available as [`MavioEncoder`] and [`MavioDecoder`].

mod assembler;
mod mavlink;

use async_trait::async_trait;

use crate::core::Channel;
use crate::errors::Result;
use crate::protocol::command::OutboundCommand;
use crate::protocol::message::DecodedMessage;

pub use mavlink::{MavioDecoder, MavioEncoder};

/// Serializes outbound commands into wire bytes.
///
/// Implementors are responsible for per-channel sequence numbering of outgoing frames.
#[async_trait]
pub trait FrameEncoder: Send + 'static {
    /// Encodes `command` into a complete frame, advancing the sequence number of its channel.
    async fn encode(&mut self, command: &OutboundCommand) -> Result<Vec<u8>>;
}

/// Incremental frame decoder over the inbound byte stream.
///
/// The decoder attributes every complete frame to the channel that owns its message kind and
/// keeps per-channel counters, so waiters on different channels never consume each other's
/// frames. Custom decoders can build messages with [`DecodedMessage::parse`].
pub trait FrameDecoder: Send + 'static {
    /// Feeds one byte of the inbound stream.
    fn feed(&mut self, byte: u8);

    /// Number of complete and valid frames attributed to `channel`.
    ///
    /// The counter never decreases.
    fn received_count(&self, channel: Channel) -> u64;

    /// Last complete frame observed on `channel`.
    fn last_decoded(&self, channel: Channel) -> Option<&DecodedMessage>;
}
