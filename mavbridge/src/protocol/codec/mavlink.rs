use async_trait::async_trait;
use mavio::dialects::common::enums::{MavCmd, MavFrame, MavParamType, PositionTargetTypemask};
use mavio::dialects::common::messages::{
    CommandInt, CommandLong, ParamSet, SetPositionTargetLocalNed,
};
use mavio::dialects::minimal::enums::{MavAutopilot, MavModeFlag, MavState, MavType};
use mavio::dialects::minimal::messages::Heartbeat;
use mavio::protocol::{Endpoint, MavLinkId, V2};

use crate::core::{Channel, PeerIdentity, CHANNEL_COUNT};
use crate::errors::{Error, ErrorKind, Result};
use crate::protocol::codec::assembler::FrameAssembler;
use crate::protocol::codec::{FrameDecoder, FrameEncoder};
use crate::protocol::command::{MavCommand, OutboundCommand, ParamKind, TargetFrame};
use crate::protocol::message::DecodedMessage;

const MAVLINK_VERSION: u8 = 3;

/// [`FrameEncoder`] that produces `MAVLink 2` frames using [`mavio`].
///
/// Every channel has its own [`Endpoint`], so sequence numbers advance independently per channel.
pub struct MavioEncoder {
    identity: PeerIdentity,
    endpoints: [Endpoint<V2>; CHANNEL_COUNT],
}

impl MavioEncoder {
    /// Creates encoder that sends on behalf of [`PeerIdentity::own_component_id`] and addresses
    /// the autopilot.
    pub fn new(identity: PeerIdentity) -> Self {
        let endpoints = Channel::ALL.map(|_| {
            Endpoint::v2(MavLinkId::new(
                identity.system_id(),
                identity.own_component_id(),
            ))
        });
        Self {
            identity,
            endpoints,
        }
    }
}

impl From<MavCommand> for MavCmd {
    fn from(value: MavCommand) -> Self {
        match value {
            MavCommand::RequestMessage => MavCmd::RequestMessage,
            MavCommand::RebootShutdown => MavCmd::PreflightRebootShutdown,
            MavCommand::ArmDisarm => MavCmd::ComponentArmDisarm,
            MavCommand::DoSetMode => MavCmd::DoSetMode,
        }
    }
}

impl From<TargetFrame> for MavFrame {
    fn from(value: TargetFrame) -> Self {
        match value {
            TargetFrame::LocalNed => MavFrame::LocalNed,
            TargetFrame::BodyOffsetNed => MavFrame::BodyOffsetNed,
        }
    }
}

impl From<ParamKind> for MavParamType {
    fn from(value: ParamKind) -> Self {
        match value {
            ParamKind::Int16 => MavParamType::Int16,
        }
    }
}

#[async_trait]
impl FrameEncoder for MavioEncoder {
    async fn encode(&mut self, command: &OutboundCommand) -> Result<Vec<u8>> {
        let endpoint = &self.endpoints[command.channel().index()];
        let target_system = self.identity.system_id();
        let target_component = self.identity.component_id();

        let frame = match command {
            OutboundCommand::Heartbeat { .. } => endpoint.next_frame(&Heartbeat {
                type_: MavType::OnboardController,
                autopilot: MavAutopilot::Invalid,
                base_mode: MavModeFlag::GUIDED_ENABLED,
                custom_mode: 0,
                system_status: MavState::Standby,
                mavlink_version: MAVLINK_VERSION,
            }),
            OutboundCommand::ParamSet {
                param_id,
                value,
                kind,
                ..
            } => endpoint.next_frame(&ParamSet {
                target_system,
                target_component,
                param_id: param_id.to_bytes(),
                param_value: *value,
                param_type: (*kind).into(),
            }),
            OutboundCommand::CommandInt {
                command,
                frame,
                params,
                x,
                y,
                z,
                ..
            } => endpoint.next_frame(&CommandInt {
                target_system,
                target_component,
                frame: (*frame).into(),
                command: (*command).into(),
                current: 0,
                autocontinue: 0,
                param1: params[0],
                param2: params[1],
                param3: params[2],
                param4: params[3],
                x: *x,
                y: *y,
                z: *z,
            }),
            OutboundCommand::CommandLong {
                command, params, ..
            } => endpoint.next_frame(&CommandLong {
                target_system,
                target_component,
                command: (*command).into(),
                confirmation: 0,
                param1: params[0],
                param2: params[1],
                param3: params[2],
                param4: params[3],
                param5: params[4],
                param6: params[5],
                param7: params[6],
            }),
            OutboundCommand::PositionTarget { target, .. } => {
                endpoint.next_frame(&SetPositionTargetLocalNed {
                    time_boot_ms: target.time_boot_ms,
                    target_system,
                    target_component,
                    coordinate_frame: target.frame.into(),
                    type_mask: PositionTargetTypemask::from_bits_truncate(target.mask.bits()),
                    x: target.position[0],
                    y: target.position[1],
                    z: target.position[2],
                    vx: target.velocity[0],
                    vy: target.velocity[1],
                    vz: target.velocity[2],
                    afx: target.acceleration[0],
                    afy: target.acceleration[1],
                    afz: target.acceleration[2],
                    yaw: target.yaw,
                    yaw_rate: target.yaw_rate,
                })
            }
        }
        .map_err(|err| Error::with_source(ErrorKind::FailedWrite, err))?;

        let mut bytes = vec![0u8; frame.size()];
        frame
            .serialize(&mut bytes)
            .map_err(|err| Error::with_source(ErrorKind::FailedWrite, err))?;

        log::trace!(
            "[{}] encoded {} #{} ({} bytes)",
            command.channel(),
            command.name(),
            frame.sequence(),
            bytes.len()
        );

        Ok(bytes)
    }
}

#[derive(Debug, Default)]
struct ChannelSlot {
    received: u64,
    last: Option<DecodedMessage>,
}

/// [`FrameDecoder`] that splits incoming bytes into `MAVLink 1` and `MAVLink 2` frames.
///
/// Every complete frame is validated by [`DecodedMessage::parse`] and attributed to the channel
/// returned by [`Channel::for_message`]. Frames with invalid checksums are dropped and never
/// counted.
#[derive(Debug, Default)]
pub struct MavioDecoder {
    assembler: FrameAssembler,
    slots: [ChannelSlot; CHANNEL_COUNT],
    dropped: u64,
}

impl MavioDecoder {
    /// Creates decoder with empty parse state on every channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of structurally complete frames rejected by validation.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }
}

impl FrameDecoder for MavioDecoder {
    fn feed(&mut self, byte: u8) {
        let Some(bytes) = self.assembler.push(byte) else {
            return;
        };

        let message = match DecodedMessage::parse(&bytes) {
            Ok(message) => message,
            Err(err) => {
                self.dropped += 1;
                log::debug!("dropped invalid frame ({} bytes): {err:?}", bytes.len());
                return;
            }
        };

        let channel = Channel::for_message(message.message_id());
        let slot = &mut self.slots[channel.index()];
        slot.received += 1;
        log::trace!(
            "[{channel}] received message #{} from {}:{}, id: {}",
            message.sequence(),
            message.system_id(),
            message.component_id(),
            message.message_id()
        );
        slot.last = Some(message);
    }

    fn received_count(&self, channel: Channel) -> u64 {
        self.slots[channel.index()].received
    }

    fn last_decoded(&self, channel: Channel) -> Option<&DecodedMessage> {
        self.slots[channel.index()].last.as_ref()
    }
}
