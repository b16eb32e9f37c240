//! # Heartbeats
//!
//! A single heartbeat announces this process to the autopilot. The supervised loop keeps sending
//! heartbeats until the first failure or until it is cancelled, the terminating error is handed
//! over to the owner of [`HeartbeatHandle`].

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::asnc::link::Link;
use crate::core::Channel;
use crate::errors::{Error, ErrorKind, Result};
use crate::protocol::OutboundCommand;

pub(in crate::asnc) async fn send_heartbeat(link: &Link) -> Result<()> {
    log::trace!("[{}] sending heartbeat", Channel::HEARTBEAT);
    link.send_message(OutboundCommand::Heartbeat {
        channel: Channel::HEARTBEAT,
    })
    .await
}

pub(in crate::asnc) struct HeartbeatEmitter {
    pub(in crate::asnc) link: Arc<Link>,
    pub(in crate::asnc) interval: Duration,
    pub(in crate::asnc) cancel: CancellationToken,
}

impl HeartbeatEmitter {
    pub(in crate::asnc) fn spawn(self) -> HeartbeatHandle {
        let cancel = self.cancel.clone();
        let task = tokio::spawn(async move { self.run().await });
        HeartbeatHandle { task, cancel }
    }

    async fn run(self) -> Option<Error> {
        loop {
            if let Err(err) = send_heartbeat(&self.link).await {
                if err.kind() == ErrorKind::Cancelled {
                    break;
                }
                log::error!("[{}] heartbeats stopped: {err}", Channel::HEARTBEAT);
                return Some(err);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        log::debug!("[{}] heartbeats emitter stopped", Channel::HEARTBEAT);
        None
    }
}

/// Handle of a supervised heartbeat loop.
///
/// Dropping the handle does not stop the loop. Use [`HeartbeatHandle::stop`] or cancel the
/// bridge.
#[derive(Debug)]
pub struct HeartbeatHandle {
    task: JoinHandle<Option<Error>>,
    cancel: CancellationToken,
}

impl HeartbeatHandle {
    /// Requests the loop to stop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` if the loop is no longer running.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the loop to stop.
    ///
    /// Returns the error that terminated the loop or `None` if it was stopped or cancelled.
    pub async fn stopped(self) -> Option<Error> {
        match self.task.await {
            Ok(result) => result,
            Err(err) => Some(Error::with_source(ErrorKind::Cancelled, err)),
        }
    }
}
