//! # Outbound commands
//!
//! [`OutboundCommand`] describes *what* the bridge wants to tell the autopilot. It is independent
//! of the wire format: turning a command into bytes is the job of a
//! [`FrameEncoder`](crate::protocol::FrameEncoder).

use std::fmt::{Debug, Display, Formatter};

use crate::core::Channel;
use crate::protocol::mask::{FieldMask, IGNORED};

/// Maximum length of a parameter name.
pub const PARAM_ID_LEN: usize = 16;

/// Commands understood by the bridge.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum MavCommand {
    /// Request a message to be emitted once (`MAV_CMD_REQUEST_MESSAGE`).
    RequestMessage = 512,
    /// Reboot or shutdown autopilot (`MAV_CMD_PREFLIGHT_REBOOT_SHUTDOWN`).
    RebootShutdown = 246,
    /// Arm or disarm motors (`MAV_CMD_COMPONENT_ARM_DISARM`).
    ArmDisarm = 400,
    /// Set autopilot mode (`MAV_CMD_DO_SET_MODE`).
    DoSetMode = 176,
}

impl MavCommand {
    /// Numeric `MAV_CMD` value.
    #[inline(always)]
    pub fn id(self) -> u16 {
        self as u16
    }
}

/// Coordinate frame of a command or a position target.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum TargetFrame {
    /// Local North-East-Down frame with origin fixed at the home position.
    LocalNed = 1,
    /// North-East-Down offsets relative to the current vehicle position.
    BodyOffsetNed = 9,
}

/// Autopilot parameter type of `PARAM_SET`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParamKind {
    /// 16-bit signed integer.
    Int16,
}

/// Autopilot parameter name.
///
/// Names longer than [`PARAM_ID_LEN`] are truncated. Shorter names are padded with zeros.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ParamId([u8; PARAM_ID_LEN]);

impl ParamId {
    /// Creates parameter name from a string.
    pub fn new(name: &str) -> Self {
        let mut bytes = [0u8; PARAM_ID_LEN];
        let len = name.len().min(PARAM_ID_LEN);
        bytes[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self(bytes)
    }

    /// Zero-padded name bytes.
    #[inline(always)]
    pub fn to_bytes(&self) -> [u8; PARAM_ID_LEN] {
        self.0
    }

    /// Parameter name without padding.
    pub fn as_str(&self) -> &str {
        let len = self
            .0
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(PARAM_ID_LEN);
        std::str::from_utf8(&self.0[..len]).unwrap_or_default()
    }
}

impl Debug for ParamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ParamId").field(&self.as_str()).finish()
    }
}

impl Display for ParamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Telemetry stream group controlled by an `SR<n>_*` rate parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TelemetryStream {
    /// `SR<n>_RAW_SENS`
    RawSensors,
    /// `SR<n>_EXT_STAT`
    ExtendedStatus,
    /// `SR<n>_RC_CHAN`
    RcChannels,
    /// `SR<n>_RAW_CTRL`
    RawControl,
    /// `SR<n>_POSITION`
    Position,
    /// `SR<n>_EXTRA1`
    Extra1,
    /// `SR<n>_EXTRA2`
    Extra2,
    /// `SR<n>_EXTRA3`
    Extra3,
    /// `SR<n>_PARAMS`
    Params,
    /// `SR<n>_ADSB`
    Adsb,
}

impl TelemetryStream {
    /// All telemetry streams in the order they are configured during initialization.
    pub const ALL: [TelemetryStream; 10] = [
        TelemetryStream::RawSensors,
        TelemetryStream::ExtendedStatus,
        TelemetryStream::RcChannels,
        TelemetryStream::RawControl,
        TelemetryStream::Position,
        TelemetryStream::Extra1,
        TelemetryStream::Extra2,
        TelemetryStream::Extra3,
        TelemetryStream::Params,
        TelemetryStream::Adsb,
    ];

    fn suffix(&self) -> &'static str {
        match self {
            TelemetryStream::RawSensors => "RAW_SENS",
            TelemetryStream::ExtendedStatus => "EXT_STAT",
            TelemetryStream::RcChannels => "RC_CHAN",
            TelemetryStream::RawControl => "RAW_CTRL",
            TelemetryStream::Position => "POSITION",
            TelemetryStream::Extra1 => "EXTRA1",
            TelemetryStream::Extra2 => "EXTRA2",
            TelemetryStream::Extra3 => "EXTRA3",
            TelemetryStream::Params => "PARAMS",
            TelemetryStream::Adsb => "ADSB",
        }
    }

    /// Rate parameter of this stream for telemetry `port`.
    pub fn param_id(&self, port: u8) -> ParamId {
        ParamId::new(&format!("SR{port}_{}", self.suffix()))
    }
}

/// Local position target.
///
/// Only the fields marked valid by [`PositionTarget::mask`] carry meaningful values. All other
/// numeric fields hold [`IGNORED`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionTarget {
    /// Milliseconds since the bridge was created.
    pub time_boot_ms: u32,
    /// Coordinate frame.
    pub frame: TargetFrame,
    /// Valid fields.
    pub mask: FieldMask,
    /// `x`, `y`, `z` in meters.
    pub position: [f32; 3],
    /// `vx`, `vy`, `vz` in meters per second.
    pub velocity: [f32; 3],
    /// `afx`, `afy`, `afz` in meters per second squared.
    pub acceleration: [f32; 3],
    /// Yaw in radians.
    pub yaw: f32,
    /// Yaw rate in radians per second.
    pub yaw_rate: f32,
}

impl PositionTarget {
    fn ignored(time_boot_ms: u32, mask: FieldMask) -> Self {
        Self {
            time_boot_ms,
            frame: TargetFrame::BodyOffsetNed,
            mask,
            position: [IGNORED; 3],
            velocity: [IGNORED; 3],
            acceleration: [IGNORED; 3],
            yaw: IGNORED,
            yaw_rate: IGNORED,
        }
    }

    /// Position offset relative to the current vehicle position.
    pub fn position(time_boot_ms: u32, x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            ..Self::ignored(time_boot_ms, FieldMask::USE_POSITION)
        }
    }

    /// Velocity in body-offset NED frame.
    pub fn velocity(time_boot_ms: u32, vx: f32, vy: f32, vz: f32) -> Self {
        Self {
            velocity: [vx, vy, vz],
            ..Self::ignored(time_boot_ms, FieldMask::USE_VELOCITY)
        }
    }

    /// Heading in radians.
    pub fn yaw(time_boot_ms: u32, yaw: f32) -> Self {
        Self {
            yaw,
            ..Self::ignored(time_boot_ms, FieldMask::USE_YAW)
        }
    }
}

/// Message the bridge sends to the autopilot.
#[derive(Clone, Debug, PartialEq)]
pub enum OutboundCommand {
    /// Presence announcement of this process (`HEARTBEAT`).
    Heartbeat {
        /// Channel to send on.
        channel: Channel,
    },
    /// Parameter write (`PARAM_SET`).
    ParamSet {
        /// Channel to send on.
        channel: Channel,
        /// Parameter name.
        param_id: ParamId,
        /// New value.
        value: f32,
        /// Parameter type.
        kind: ParamKind,
    },
    /// Command with integer position fields (`COMMAND_INT`).
    CommandInt {
        /// Channel to send on.
        channel: Channel,
        /// Command.
        command: MavCommand,
        /// Coordinate frame of `x`, `y`, `z`.
        frame: TargetFrame,
        /// `param1` to `param4`.
        params: [f32; 4],
        /// `x` position.
        x: i32,
        /// `y` position.
        y: i32,
        /// `z` position.
        z: f32,
    },
    /// Command with seven float parameters (`COMMAND_LONG`).
    CommandLong {
        /// Channel to send on.
        channel: Channel,
        /// Command.
        command: MavCommand,
        /// `param1` to `param7`.
        params: [f32; 7],
    },
    /// Local position target (`SET_POSITION_TARGET_LOCAL_NED`).
    PositionTarget {
        /// Channel to send on.
        channel: Channel,
        /// Target.
        target: PositionTarget,
    },
}

impl OutboundCommand {
    /// Channel this command is sent on.
    pub fn channel(&self) -> Channel {
        match self {
            OutboundCommand::Heartbeat { channel }
            | OutboundCommand::ParamSet { channel, .. }
            | OutboundCommand::CommandInt { channel, .. }
            | OutboundCommand::CommandLong { channel, .. }
            | OutboundCommand::PositionTarget { channel, .. } => *channel,
        }
    }

    /// Short human-readable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundCommand::Heartbeat { .. } => "HEARTBEAT",
            OutboundCommand::ParamSet { .. } => "PARAM_SET",
            OutboundCommand::CommandInt { .. } => "COMMAND_INT",
            OutboundCommand::CommandLong { .. } => "COMMAND_LONG",
            OutboundCommand::PositionTarget { .. } => "SET_POSITION_TARGET_LOCAL_NED",
        }
    }
}
