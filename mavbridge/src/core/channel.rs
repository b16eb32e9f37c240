//! # Channel registry
//!
//! A [`Channel`] partitions independent message streams multiplexed over a single transport. Each
//! channel owns its own outgoing sequence counter and its own incoming parse state, so unrelated
//! streams remain independently trackable.
//!
//! Channels can't be constructed from arbitrary numbers. The only channels in existence are
//! [`Channel::HEARTBEAT`], [`Channel::TARGETS`], and [`Channel::POSITIONS`].
//!
//! Inbound frames carry no channel. They are attributed to a channel by their message kind, see
//! [`Channel::for_message`].

use std::fmt::{Display, Formatter};

use crate::core::consts::{
    MSG_ID_GLOBAL_POSITION_INT, MSG_ID_LOCAL_POSITION_NED, MSG_ID_POSITION_TARGET_GLOBAL_INT,
    MSG_ID_POSITION_TARGET_LOCAL_NED, MSG_ID_SET_POSITION_TARGET_GLOBAL_INT,
    MSG_ID_SET_POSITION_TARGET_LOCAL_NED,
};
use crate::protocol::MessageId;

/// Number of registered channels.
pub const CHANNEL_COUNT: usize = 3;

/// Logical message channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Channel(u8);

impl Channel {
    /// Heartbeats, parameter setup, commands and their acknowledgments.
    pub const HEARTBEAT: Channel = Channel(0);
    /// Guided-mode targets.
    pub const TARGETS: Channel = Channel(1);
    /// Local position targets and global position reports.
    pub const POSITIONS: Channel = Channel(2);

    /// All registered channels in the order of their `ID`.
    pub const ALL: [Channel; CHANNEL_COUNT] =
        [Channel::HEARTBEAT, Channel::TARGETS, Channel::POSITIONS];

    /// Numeric channel `ID`.
    #[inline(always)]
    pub fn id(&self) -> u8 {
        self.0
    }

    /// Channel that owns inbound messages of kind `message_id`.
    ///
    /// Position reports belong to [`Channel::POSITIONS`], position targets and their echoes to
    /// [`Channel::TARGETS`]. Everything else, including heartbeats and command acknowledgments,
    /// belongs to [`Channel::HEARTBEAT`].
    pub fn for_message(message_id: MessageId) -> Channel {
        match message_id {
            MSG_ID_LOCAL_POSITION_NED | MSG_ID_GLOBAL_POSITION_INT => Channel::POSITIONS,
            MSG_ID_SET_POSITION_TARGET_LOCAL_NED
            | MSG_ID_POSITION_TARGET_LOCAL_NED
            | MSG_ID_SET_POSITION_TARGET_GLOBAL_INT
            | MSG_ID_POSITION_TARGET_GLOBAL_INT => Channel::TARGETS,
            _ => Channel::HEARTBEAT,
        }
    }

    /// Position of the channel in per-channel tables.
    #[inline(always)]
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            Channel::HEARTBEAT => "heartbeat",
            Channel::TARGETS => "targets",
            Channel::POSITIONS => "positions",
            _ => "unknown",
        };
        write!(f, "{name}#{}", self.0)
    }
}
