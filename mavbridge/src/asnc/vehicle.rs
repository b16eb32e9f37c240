//! # Vehicle controller
//!
//! Sends arming and mode commands and commits [`VehicleState`] transitions once the autopilot
//! has acknowledged them.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::asnc::link::{Arrivals, Link};
use crate::core::consts::MAV_RESULT_ACCEPTED;
use crate::core::{Channel, VehicleCommand, VehicleState};
use crate::errors::{Error, ErrorKind, Result};
use crate::protocol::{MavCommand, OutboundCommand};

/// `MAV_MODE_FLAG_CUSTOM_MODE_ENABLED`
const CUSTOM_MODE_ENABLED: f32 = 1.0;

pub(in crate::asnc) struct VehicleController {
    link: Arc<Link>,
    state: Mutex<VehicleState>,
}

impl VehicleController {
    pub(in crate::asnc) fn new(link: Arc<Link>) -> Self {
        Self {
            link,
            state: Mutex::new(VehicleState::default()),
        }
    }

    pub(in crate::asnc) async fn state(&self) -> VehicleState {
        *self.state.lock().await
    }

    /// Requests a transition and commits it once acknowledged.
    ///
    /// The state lock is held for the whole exchange, so concurrent requests are applied one at
    /// a time.
    pub(in crate::asnc) async fn request(&self, command: VehicleCommand) -> Result<VehicleState> {
        let mut state = self.state.lock().await;
        let next = state.transition(command)?;

        let (mav_command, params) = self.mav_command(command);
        let mut acks = self.link.subscribe(Channel::HEARTBEAT);
        self.link
            .send_message(OutboundCommand::CommandLong {
                channel: Channel::HEARTBEAT,
                command: mav_command,
                params,
            })
            .await?;
        let (command_id, result) = self.wait_for_ack(&mut acks, mav_command.id()).await?;

        if result != MAV_RESULT_ACCEPTED {
            log::warn!(
                "[{}] {command} denied by autopilot, command: {command_id}, result: {result}",
                Channel::HEARTBEAT
            );
            return Err(Error::with_source(
                ErrorKind::CommandDenied,
                format!("command {command_id} rejected with result {result}"),
            ));
        }

        log::info!("[{}] vehicle {}: {state} -> {next}", Channel::HEARTBEAT, command);
        *state = next;
        Ok(next)
    }

    fn mav_command(&self, command: VehicleCommand) -> (MavCommand, [f32; 7]) {
        let (mav_command, param1, param2) = match command {
            VehicleCommand::Arm => (MavCommand::ArmDisarm, 1.0, 0.0),
            VehicleCommand::Disarm => (MavCommand::ArmDisarm, 0.0, 0.0),
            VehicleCommand::Guided => (
                MavCommand::DoSetMode,
                CUSTOM_MODE_ENABLED,
                self.link.conf().guided_custom_mode() as f32,
            ),
        };

        (mav_command, [param1, param2, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    async fn wait_for_ack(&self, acks: &mut Arrivals, command_id: u16) -> Result<(u16, u8)> {
        self.link
            .receive_selected(acks, self.link.conf().ack_timeout(), |message| {
                Ok(message
                    .command_ack()?
                    .filter(|ack| ack.command == command_id)
                    .map(|ack| (ack.command, ack.result)))
            })
            .await
    }
}
