//! # Position commander
//!
//! Guided-mode targets relative to the current vehicle position. Each call sends exactly one
//! target; repeating targets at a rate accepted by the autopilot is up to the caller.

use std::sync::Arc;

use tokio::time::Instant;

use crate::asnc::link::Link;
use crate::core::consts::MSG_ID_GLOBAL_POSITION_INT;
use crate::core::Channel;
use crate::errors::Result;
use crate::protocol::{GlobalPosition, MavCommand, OutboundCommand, PositionTarget};

pub(in crate::asnc) struct PositionCommander {
    link: Arc<Link>,
    started_at: Instant,
}

impl PositionCommander {
    pub(in crate::asnc) fn new(link: Arc<Link>) -> Self {
        Self {
            link,
            started_at: Instant::now(),
        }
    }

    pub(in crate::asnc) async fn set_target_position_local(&self, position: [f32; 3]) -> Result<()> {
        let [x, y, z] = position;
        self.send_target(PositionTarget::position(self.time_boot_ms(), x, y, z))
            .await
    }

    pub(in crate::asnc) async fn set_target_velocity_local(&self, velocity: [f32; 3]) -> Result<()> {
        let [vx, vy, vz] = velocity;
        self.send_target(PositionTarget::velocity(self.time_boot_ms(), vx, vy, vz))
            .await
    }

    pub(in crate::asnc) async fn set_target_heading_local(&self, yaw: f32) -> Result<()> {
        self.send_target(PositionTarget::yaw(self.time_boot_ms(), yaw))
            .await
    }

    pub(in crate::asnc) async fn get_position_global(&self) -> Result<GlobalPosition> {
        let mut reports = self.link.subscribe(Channel::POSITIONS);
        self.link
            .send_message(OutboundCommand::CommandLong {
                channel: Channel::POSITIONS,
                command: MavCommand::RequestMessage,
                params: [MSG_ID_GLOBAL_POSITION_INT as f32, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            })
            .await?;

        let position = self
            .link
            .receive_selected(&mut reports, self.link.conf().ack_timeout(), |message| {
                message.global_position()
            })
            .await?;

        log::debug!("[{}] global position: {position:?}", Channel::POSITIONS);
        Ok(position)
    }

    async fn send_target(&self, target: PositionTarget) -> Result<()> {
        self.link
            .send_message(OutboundCommand::PositionTarget {
                channel: Channel::POSITIONS,
                target,
            })
            .await
    }

    fn time_boot_ms(&self) -> u32 {
        self.started_at.elapsed().as_millis() as u32
    }
}
