//! # Message exchange primitives
//!
//! [`Link`] is the only component that touches the transport and the codec. Writes and reads are
//! guarded by two independent mutexes, so reading never blocks writing and frames of concurrent
//! sends never interleave on the wire.
//!
//! Inbound frames are attributed to channels by the decoder and published to per-channel
//! [`Arrivals`] queues. Whoever holds the read lock feeds the decoder on behalf of everyone, so
//! waiters on different channels never consume each other's frames.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use crate::core::consts::{ARRIVALS_CAPACITY, READ_CHUNK_SIZE};
use crate::core::{BridgeConf, Channel, CHANNEL_COUNT};
use crate::errors::{Error, ErrorKind, Result};
use crate::protocol::{DecodedMessage, FrameDecoder, FrameEncoder, OutboundCommand};

/// Boxed write half of a transport.
pub(crate) type TransportWriter = Box<dyn AsyncWrite + Send + Unpin>;
/// Boxed read half of a transport.
pub(crate) type TransportReader = Box<dyn AsyncRead + Send + Unpin>;

struct Outbound {
    writer: TransportWriter,
    encoder: Box<dyn FrameEncoder>,
}

struct Inbound {
    reader: TransportReader,
    decoder: Box<dyn FrameDecoder>,
    pending: VecDeque<u8>,
    published: [u64; CHANNEL_COUNT],
}

/// Messages attributed to a channel after the moment of subscription.
///
/// Obtained from [`Link::subscribe`]. Subscribing before sending a request guarantees that the
/// reply is observed even if another waiter reads it from the transport first.
pub(crate) struct Arrivals {
    channel: Channel,
    receiver: broadcast::Receiver<DecodedMessage>,
}

impl Arrivals {
    fn try_take(&mut self) -> Option<DecodedMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("[{}] missed {skipped} messages", self.channel)
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

/// Serialized access to the transport and the codec.
pub(crate) struct Link {
    conf: Arc<BridgeConf>,
    outbound: Mutex<Outbound>,
    inbound: Mutex<Inbound>,
    arrivals: [broadcast::Sender<DecodedMessage>; CHANNEL_COUNT],
    cancel: CancellationToken,
}

impl Link {
    pub(crate) fn new(
        conf: Arc<BridgeConf>,
        reader: TransportReader,
        writer: TransportWriter,
        encoder: Box<dyn FrameEncoder>,
        decoder: Box<dyn FrameDecoder>,
        cancel: CancellationToken,
    ) -> Self {
        let published = Channel::ALL.map(|channel| decoder.received_count(channel));
        Self {
            conf,
            outbound: Mutex::new(Outbound { writer, encoder }),
            inbound: Mutex::new(Inbound {
                reader,
                decoder,
                pending: VecDeque::new(),
                published,
            }),
            arrivals: Channel::ALL.map(|_| broadcast::channel(ARRIVALS_CAPACITY).0),
            cancel,
        }
    }

    pub(crate) fn conf(&self) -> &BridgeConf {
        self.conf.as_ref()
    }

    pub(crate) fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Encodes `command` and writes it to the transport within
    /// [`BridgeConf::write_timeout`].
    ///
    /// Fails with [`ErrorKind::FailedWrite`] if encoding or writing fails and with
    /// [`ErrorKind::TransmitTimeout`] if the deadline is exceeded. Never retries.
    pub(crate) async fn send_message(&self, command: OutboundCommand) -> Result<()> {
        let channel = command.channel();
        let name = command.name();

        let send = async {
            let mut outbound = self.outbound.lock().await;
            let bytes = outbound.encoder.encode(&command).await?;

            outbound
                .writer
                .write_all(&bytes)
                .await
                .map_err(Error::failed_write)?;
            outbound.writer.flush().await.map_err(Error::failed_write)?;

            log::trace!("[{channel}] sent {name} ({} bytes)", bytes.len());
            Ok(())
        };

        let result = self
            .bounded(self.conf.write_timeout(), ErrorKind::TransmitTimeout, send)
            .await;
        if let Err(err) = &result {
            log::warn!("[{channel}] can't send {name}: {err}");
        }
        result
    }

    /// Starts tracking messages attributed to `channel` from this moment on.
    pub(crate) fn subscribe(&self, channel: Channel) -> Arrivals {
        Arrivals {
            channel,
            receiver: self.arrivals[channel.index()].subscribe(),
        }
    }

    /// Waits until the next frame is decoded on `channel`.
    ///
    /// Fails with [`ErrorKind::ReceiveTimeout`] if no frame arrives within `timeout` and with
    /// [`ErrorKind::FailedRead`] if the transport fails or the stream ends.
    pub(crate) async fn wait_for_next_message(
        &self,
        channel: Channel,
        timeout: Duration,
    ) -> Result<DecodedMessage> {
        let mut arrivals = self.subscribe(channel);
        self.receive(&mut arrivals, timeout).await
    }

    /// Waits within a single deadline for the first message on `channel` accepted by `select`.
    ///
    /// Messages for which `select` returns `Ok(None)` are skipped.
    pub(crate) async fn wait_for_message<T, F>(
        &self,
        channel: Channel,
        timeout: Duration,
        select: F,
    ) -> Result<T>
    where
        F: FnMut(&DecodedMessage) -> Result<Option<T>>,
    {
        let mut arrivals = self.subscribe(channel);
        self.receive_selected(&mut arrivals, timeout, select).await
    }

    /// Same as [`Link::wait_for_next_message`] for a channel subscribed in advance.
    pub(crate) async fn receive(
        &self,
        arrivals: &mut Arrivals,
        timeout: Duration,
    ) -> Result<DecodedMessage> {
        self.bounded(timeout, ErrorKind::ReceiveTimeout, self.next_message(arrivals))
            .await
    }

    /// Same as [`Link::wait_for_message`] for a channel subscribed in advance.
    pub(crate) async fn receive_selected<T, F>(
        &self,
        arrivals: &mut Arrivals,
        timeout: Duration,
        mut select: F,
    ) -> Result<T>
    where
        F: FnMut(&DecodedMessage) -> Result<Option<T>>,
    {
        let wait = async {
            loop {
                let message = self.next_message(arrivals).await?;
                match select(&message)? {
                    Some(value) => return Ok(value),
                    None => log::trace!(
                        "[{}] skipped message id: {}",
                        arrivals.channel,
                        message.message_id()
                    ),
                }
            }
        };
        self.bounded(timeout, ErrorKind::ReceiveTimeout, wait).await
    }

    async fn next_message(&self, arrivals: &mut Arrivals) -> Result<DecodedMessage> {
        let channel = arrivals.channel;

        loop {
            if let Some(message) = arrivals.try_take() {
                return Ok(message);
            }

            tokio::select! {
                received = arrivals.receiver.recv() => match received {
                    Ok(message) => return Ok(message),
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("[{channel}] missed {skipped} messages")
                    }
                    Err(RecvError::Closed) => return Err(Error::new(ErrorKind::Cancelled)),
                },
                inbound = self.inbound.lock() => {
                    let mut inbound = inbound;
                    self.read_until_arrival(&mut inbound, channel).await?;
                }
            }
        }
    }

    /// Feeds the decoder until a frame is attributed to `channel`.
    ///
    /// Frames attributed to other channels are published along the way. Bytes that were read but
    /// not fed stay pending for the next reader.
    async fn read_until_arrival(&self, inbound: &mut Inbound, channel: Channel) -> Result<()> {
        loop {
            while let Some(byte) = inbound.pending.pop_front() {
                inbound.decoder.feed(byte);
                if self.publish(inbound) == Some(channel) {
                    return Ok(());
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let n = inbound
                .reader
                .read(&mut chunk)
                .await
                .map_err(Error::failed_read)?;
            if n == 0 {
                log::debug!("[{channel}] transport stream ended");
                return Err(Error::failed_read(std::io::Error::from(
                    std::io::ErrorKind::UnexpectedEof,
                )));
            }
            inbound.pending.extend(&chunk[..n]);
        }
    }

    /// Publishes a frame newly attributed to some channel and returns that channel.
    fn publish(&self, inbound: &mut Inbound) -> Option<Channel> {
        for channel in Channel::ALL {
            let count = inbound.decoder.received_count(channel);
            let published = &mut inbound.published[channel.index()];
            if count == *published {
                continue;
            }
            *published = count;

            if let Some(message) = inbound.decoder.last_decoded(channel) {
                // Fails only when nobody is subscribed
                let _ = self.arrivals[channel.index()].send(message.clone());
            }
            return Some(channel);
        }
        None
    }

    async fn bounded<T>(
        &self,
        timeout: Duration,
        on_timeout: ErrorKind,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::new(ErrorKind::Cancelled)),
            result = tokio::time::timeout(timeout, operation) => {
                result.unwrap_or_else(|_| Err(Error::new(on_timeout)))
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn received_count(&self, channel: Channel) -> u64 {
        self.inbound.lock().await.decoder.received_count(channel)
    }
}

#[cfg(test)]
mod tests {
    use mavio::dialects::common::enums::MavResult;

    use super::*;
    use crate::protocol::MavCommand;
    use crate::test_utils::{
        corrupt_checksum, encode_command_ack, encode_global_position, encode_heartbeat,
        init_logger, make_link, MockTransport,
    };

    fn heartbeat() -> OutboundCommand {
        OutboundCommand::Heartbeat {
            channel: Channel::HEARTBEAT,
        }
    }

    #[tokio::test]
    async fn send_message_writes_complete_frame() {
        init_logger();

        let transport = MockTransport::new();
        let link = make_link(transport.clone(), BridgeConf::default());

        link.send_message(heartbeat()).await.unwrap();

        let writes = transport.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0][0], 0xFD);
    }

    #[tokio::test]
    async fn send_message_fails_on_transport_error() {
        init_logger();

        let transport = MockTransport::new().fail_write(1);
        let link = make_link(transport.clone(), BridgeConf::default());

        let err = link.send_message(heartbeat()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedWrite);
        assert!(err.transport_error().is_some());
    }

    #[tokio::test]
    async fn send_message_fails_on_short_write() {
        init_logger();

        let transport = MockTransport::new().short_write(1);
        let link = make_link(transport.clone(), BridgeConf::default());

        let err = link.send_message(heartbeat()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedWrite);
    }

    #[tokio::test(start_paused = true)]
    async fn send_message_times_out_on_stalled_transport() {
        init_logger();

        let transport = MockTransport::new().stall_writes();
        let conf = BridgeConf::builder()
            .write_timeout(Duration::from_millis(100))
            .build();
        let link = make_link(transport, conf);

        let err = link.send_message(heartbeat()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransmitTimeout);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_without_advancing_cursor() {
        init_logger();

        let heartbeat = encode_heartbeat();
        let transport = MockTransport::new().inbound(&heartbeat[..5]);
        let link = make_link(transport, BridgeConf::default());

        let err = link
            .wait_for_next_message(Channel::HEARTBEAT, Duration::from_millis(100))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ReceiveTimeout);
        assert_eq!(link.received_count(Channel::HEARTBEAT).await, 0);
    }

    #[tokio::test]
    async fn wait_fails_when_stream_ends() {
        init_logger();

        let transport = MockTransport::new().close_inbound();
        let link = make_link(transport, BridgeConf::default());

        let err = link
            .wait_for_next_message(Channel::HEARTBEAT, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FailedRead);
    }

    #[tokio::test]
    async fn cursor_advances_once_per_frame() {
        init_logger();

        let heartbeat = encode_heartbeat();
        let ack = encode_command_ack(MavCommand::RebootShutdown, MavResult::Accepted);
        let mut inbound = heartbeat.clone();
        inbound.extend_from_slice(&ack);
        inbound.extend_from_slice(&heartbeat);

        let transport = MockTransport::new().inbound(&inbound);
        let link = make_link(transport, BridgeConf::default());

        let mut last = 0;
        for expected_id in [0, 77, 0] {
            let message = link
                .wait_for_next_message(Channel::HEARTBEAT, Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(message.message_id(), expected_id);

            let count = link.received_count(Channel::HEARTBEAT).await;
            assert_eq!(count, last + 1);
            last = count;
        }

        assert_eq!(link.received_count(Channel::POSITIONS).await, 0);
    }

    #[tokio::test]
    async fn wait_for_message_skips_unselected() {
        init_logger();

        let mut inbound = encode_heartbeat();
        let ack = encode_command_ack(MavCommand::ArmDisarm, MavResult::Accepted);
        inbound.extend_from_slice(&ack);

        let transport = MockTransport::new().inbound(&inbound);
        let link = make_link(transport, BridgeConf::default());

        let ack = link
            .wait_for_message(Channel::HEARTBEAT, Duration::from_secs(1), |msg| {
                msg.command_ack()
            })
            .await
            .unwrap();

        assert_eq!(ack.command, 400);
        assert_eq!(link.received_count(Channel::HEARTBEAT).await, 2);
    }

    #[tokio::test]
    async fn cancellation_interrupts_wait() {
        init_logger();

        let transport = MockTransport::new();
        let link = make_link(transport, BridgeConf::default());
        link.cancellation_token().cancel();

        let err = link
            .wait_for_next_message(Channel::HEARTBEAT, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_frame_survives_timeout() {
        init_logger();

        let heartbeat = encode_heartbeat();
        let transport = MockTransport::new().inbound(&heartbeat[..5]);
        let link = make_link(transport.clone(), BridgeConf::default());

        let err = link
            .wait_for_next_message(Channel::HEARTBEAT, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReceiveTimeout);

        transport.push_inbound(&heartbeat[5..]);

        let message = link
            .wait_for_next_message(Channel::HEARTBEAT, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(message.message_id(), 0);
        assert_eq!(message.bytes(), heartbeat.as_slice());
        assert_eq!(link.received_count(Channel::HEARTBEAT).await, 1);
    }

    #[tokio::test]
    async fn partial_frame_survives_dropped_wait() {
        init_logger();

        let heartbeat = encode_heartbeat();
        let transport = MockTransport::new().inbound(&heartbeat[..5]);
        let link = make_link(transport.clone(), BridgeConf::default());
        let interrupt = CancellationToken::new();
        tokio::spawn({
            let interrupt = interrupt.clone();
            async move { interrupt.cancel() }
        });

        tokio::select! {
            biased;
            _ = link.wait_for_next_message(Channel::HEARTBEAT, Duration::from_secs(1)) => {
                panic!("incomplete frame must not be returned")
            }
            _ = interrupt.cancelled() => {}
        }

        assert_eq!(link.received_count(Channel::HEARTBEAT).await, 0);
        transport.push_inbound(&heartbeat[5..]);

        let message = link
            .wait_for_next_message(Channel::HEARTBEAT, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(message.bytes(), heartbeat.as_slice());
        assert_eq!(link.received_count(Channel::HEARTBEAT).await, 1);
    }

    #[tokio::test]
    async fn invalid_frame_is_not_a_message() {
        init_logger();

        let mut inbound = corrupt_checksum(encode_heartbeat());
        inbound.extend_from_slice(&encode_command_ack(
            MavCommand::RebootShutdown,
            MavResult::Accepted,
        ));
        let transport = MockTransport::new().inbound(&inbound);
        let link = make_link(transport, BridgeConf::default());

        let message = link
            .wait_for_next_message(Channel::HEARTBEAT, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(message.message_id(), 77);
        assert_eq!(link.received_count(Channel::HEARTBEAT).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_waits_receive_own_channels() {
        init_logger();

        let transport = MockTransport::new();
        let link = make_link(transport.clone(), BridgeConf::default());

        let mut positions = link.subscribe(Channel::POSITIONS);
        let mut acks = link.subscribe(Channel::HEARTBEAT);
        let timeout = Duration::from_secs(1);

        let (position, ack, _) = tokio::join!(
            link.receive_selected(&mut positions, timeout, |msg| msg.global_position()),
            link.receive_selected(&mut acks, timeout, |msg| msg.command_ack()),
            async {
                tokio::task::yield_now().await;
                // Both replies arrive in a single read, the acknowledgment goes first
                let mut inbound =
                    encode_command_ack(MavCommand::ArmDisarm, MavResult::Accepted);
                inbound.extend_from_slice(&encode_heartbeat());
                inbound.extend_from_slice(&encode_global_position(47.5, 8.25, 420.0, 10.0));
                transport.push_inbound(&inbound);
            },
        );

        assert!((position.unwrap().latitude_deg - 47.5).abs() < 1e-6);
        assert_eq!(ack.unwrap().command, 400);
        assert_eq!(link.received_count(Channel::HEARTBEAT).await, 2);
        assert_eq!(link.received_count(Channel::POSITIONS).await, 1);
    }
}
