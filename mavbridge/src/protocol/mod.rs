//! MAVLink protocol entities.
//!
//! Outbound commands, field masks, received messages and the codec seam between the bridge and
//! the wire format.

mod codec;
mod command;
mod mask;
mod message;

pub use codec::{FrameDecoder, FrameEncoder, MavioDecoder, MavioEncoder};
pub use command::{
    MavCommand, OutboundCommand, ParamId, ParamKind, PositionTarget, TargetFrame,
    TelemetryStream, PARAM_ID_LEN,
};
pub use mask::{FieldMask, TargetField, IGNORED};
pub use message::{CommandAck, DecodedMessage, GlobalPosition, WireVersion};

pub use mavio::protocol::{ComponentId, MessageId, SystemId};
