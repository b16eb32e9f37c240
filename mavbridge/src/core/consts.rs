//! # Common constants

use std::time::Duration;

use crate::protocol::MessageId;

/// Default heartbeat interval used by the supervised heartbeat loop.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1000);
/// Default deadline for a single encode + write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(1000);
/// Default deadline for awaiting a reply to a command.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(3000);

/// MAVLink system `ID` shared by the autopilot and the companion computer.
pub const DEFAULT_SYSTEM_ID: u8 = 1;
/// Autopilot component `ID`.
pub const DEFAULT_AUTOPILOT_COMPONENT_ID: u8 = 1;
/// Component `ID` of this process.
pub const DEFAULT_OWN_COMPONENT_ID: u8 = 5;

/// Telemetry port whose `SR<n>_*` stream parameters are pinned during initialization.
pub const DEFAULT_STREAM_PORT: u8 = 0;
/// Rate (Hz) all telemetry streams are pinned to during initialization.
pub const DEFAULT_STREAM_RATE: f32 = 0.0;
/// ArduPilot custom mode number of `GUIDED`.
pub const DEFAULT_GUIDED_CUSTOM_MODE: u32 = 4;

/// Size of a single transport read.
pub(crate) const READ_CHUNK_SIZE: usize = 64;
/// Messages buffered per channel for a waiter that hasn't observed them yet.
pub(crate) const ARRIVALS_CAPACITY: usize = 64;

/// `LOCAL_POSITION_NED` message `ID`.
pub const MSG_ID_LOCAL_POSITION_NED: MessageId = 32;
/// `GLOBAL_POSITION_INT` message `ID`.
pub const MSG_ID_GLOBAL_POSITION_INT: MessageId = 33;
/// `COMMAND_ACK` message `ID`.
pub const MSG_ID_COMMAND_ACK: MessageId = 77;
/// `SET_POSITION_TARGET_LOCAL_NED` message `ID`.
pub const MSG_ID_SET_POSITION_TARGET_LOCAL_NED: MessageId = 84;
/// `POSITION_TARGET_LOCAL_NED` message `ID`.
pub const MSG_ID_POSITION_TARGET_LOCAL_NED: MessageId = 85;
/// `SET_POSITION_TARGET_GLOBAL_INT` message `ID`.
pub const MSG_ID_SET_POSITION_TARGET_GLOBAL_INT: MessageId = 86;
/// `POSITION_TARGET_GLOBAL_INT` message `ID`.
pub const MSG_ID_POSITION_TARGET_GLOBAL_INT: MessageId = 87;

/// `MAV_RESULT_ACCEPTED`.
pub const MAV_RESULT_ACCEPTED: u8 = 0;
