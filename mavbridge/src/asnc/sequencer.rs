//! # Initialization sequence
//!
//! Pins all telemetry stream rates, reboots the autopilot and confirms that the next message on
//! the heartbeat channel is a command acknowledgment. The sequence is strictly ordered and stops
//! at the first failure.

use std::sync::Arc;

use crate::asnc::link::Link;
use crate::core::consts::MSG_ID_COMMAND_ACK;
use crate::core::Channel;
use crate::errors::{Error, ErrorKind, Result};
use crate::protocol::{MavCommand, OutboundCommand, ParamKind, TargetFrame, TelemetryStream};

pub(in crate::asnc) struct CommandSequencer {
    link: Arc<Link>,
}

impl CommandSequencer {
    pub(in crate::asnc) fn new(link: Arc<Link>) -> Self {
        Self { link }
    }

    pub(in crate::asnc) async fn run(&self) -> Result<()> {
        for command in self.stream_commands() {
            self.link.send_message(command).await?;
        }

        let mut replies = self.link.subscribe(Channel::HEARTBEAT);
        self.link.send_message(Self::reboot_command()).await?;

        let reply = self
            .link
            .receive(&mut replies, self.link.conf().ack_timeout())
            .await?;

        log::info!(
            "[{}] sent reboot, got reply msgid: {}",
            Channel::HEARTBEAT,
            reply.message_id()
        );

        if reply.message_id() != MSG_ID_COMMAND_ACK {
            return Err(Error::with_source(
                ErrorKind::NoCommandAck,
                format!("unexpected message id: {}", reply.message_id()),
            ));
        }

        Ok(())
    }

    fn stream_commands(&self) -> impl Iterator<Item = OutboundCommand> {
        let port = self.link.conf().stream_port();
        let rate = self.link.conf().stream_rate();

        TelemetryStream::ALL
            .into_iter()
            .map(move |stream| OutboundCommand::ParamSet {
                channel: Channel::HEARTBEAT,
                param_id: stream.param_id(port),
                value: rate,
                kind: ParamKind::Int16,
            })
    }

    fn reboot_command() -> OutboundCommand {
        OutboundCommand::CommandInt {
            channel: Channel::HEARTBEAT,
            command: MavCommand::RebootShutdown,
            frame: TargetFrame::LocalNed,
            // Reboot autopilot, keep companion computer and other components
            params: [1.0, 0.0, 0.0, 0.0],
            x: 0,
            y: 0,
            z: 0.0,
        }
    }
}
