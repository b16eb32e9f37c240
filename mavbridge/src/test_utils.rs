//! Mavbridge test utils.
//!
//! These utils are generated only when `#[cfg(test)]` enabled.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Once};
use std::task::{Context, Poll, Waker};

use mavio::dialects::common::enums::{MavCmd, MavResult};
use mavio::dialects::common::messages::{CommandAck, GlobalPositionInt, LocalPositionNed};
use mavio::dialects::minimal::enums::{MavAutopilot, MavState, MavType};
use mavio::dialects::minimal::messages::Heartbeat;
use mavio::protocol::{Endpoint, MavLinkId, V2};
use mavio::Frame;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::sync::CancellationToken;

use crate::asnc::link::Link;
use crate::core::BridgeConf;
use crate::protocol::{MavCommand, MavioDecoder, MavioEncoder};

static INIT_LOGGER: Once = Once::new();
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Debug;

pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::builder()
            // Suppress everything below `warn` for third-party modules
            .filter_level(log::LevelFilter::Warn)
            // Allow everything above `LOG_LEVEL` from current package
            .filter_module(env!("CARGO_PKG_NAME"), LOG_LEVEL)
            .is_test(true)
            .init();
    });
}

#[derive(Default)]
struct MockState {
    writes: Vec<Vec<u8>>,
    current: Vec<u8>,
    frame_idx: usize,
    fail_write: Option<usize>,
    short_write: Option<usize>,
    stall_writes: bool,
    chunk_size: Option<usize>,
    yield_pending: bool,
    inbound: VecDeque<u8>,
    inbound_closed: bool,
    read_waker: Option<Waker>,
}

/// In-memory transport.
///
/// Every flushed write is recorded as a separate entry, which corresponds to one frame. Write
/// numbers used by fault injection are 1-based and count frames, not `poll_write` calls.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `n`-th frame write with I/O error.
    pub fn fail_write(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_write = Some(n);
        self
    }

    /// Report zero bytes written for `n`-th frame.
    pub fn short_write(self, n: usize) -> Self {
        self.state.lock().unwrap().short_write = Some(n);
        self
    }

    /// Never complete any write.
    pub fn stall_writes(self) -> Self {
        self.state.lock().unwrap().stall_writes = true;
        self
    }

    /// Accept at most `size` bytes per `poll_write` and yield to the scheduler between chunks.
    pub fn chunked_writes(self, size: usize) -> Self {
        self.state.lock().unwrap().chunk_size = Some(size);
        self
    }

    /// Script inbound bytes.
    pub fn inbound(self, bytes: &[u8]) -> Self {
        self.push_inbound(bytes);
        self
    }

    /// Report end of stream once scripted inbound bytes are consumed.
    pub fn close_inbound(self) -> Self {
        self.state.lock().unwrap().inbound_closed = true;
        self
    }

    pub fn push_inbound(&self, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.inbound.extend(bytes);
        if let Some(waker) = state.read_waker.take() {
            waker.wake();
        }
    }

    /// Recorded frames.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Number of attempted frame writes, including failed ones.
    pub fn write_attempts(&self) -> usize {
        self.state.lock().unwrap().frame_idx
    }
}

impl AsyncWrite for MockTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = self.state.lock().unwrap();

        if state.stall_writes {
            return Poll::Pending;
        }

        if state.current.is_empty() && !state.yield_pending {
            state.frame_idx += 1;
            let idx = Some(state.frame_idx);
            if state.fail_write == idx {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "scripted write failure",
                )));
            }
            if state.short_write == idx {
                return Poll::Ready(Ok(0));
            }
        }

        let len = match state.chunk_size {
            Some(size) => {
                if state.yield_pending {
                    state.yield_pending = false;
                } else if !state.current.is_empty() {
                    state.yield_pending = true;
                    cx.waker().wake_by_ref();
                    return Poll::Pending;
                }
                size.min(buf.len())
            }
            None => buf.len(),
        };

        state.current.extend_from_slice(&buf[..len]);
        Poll::Ready(Ok(len))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut state = self.state.lock().unwrap();
        if !state.current.is_empty() {
            let frame = std::mem::take(&mut state.current);
            state.writes.push(frame);
        }
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.poll_flush(cx)
    }
}

impl AsyncRead for MockTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut state = self.state.lock().unwrap();

        if state.inbound.is_empty() {
            if state.inbound_closed {
                return Poll::Ready(Ok(()));
            }
            state.read_waker = Some(cx.waker().clone());
            return Poll::Pending;
        }

        let len = buf.remaining().min(state.inbound.len());
        let bytes: Vec<u8> = state.inbound.drain(..len).collect();
        buf.put_slice(&bytes);
        Poll::Ready(Ok(()))
    }
}

/// Creates [`Link`] over `transport` with default codec.
pub fn make_link(transport: MockTransport, conf: BridgeConf) -> Arc<Link> {
    let (reader, writer) = tokio::io::split(transport);
    Arc::new(Link::new(
        Arc::new(conf.clone()),
        Box::new(reader),
        Box::new(writer),
        Box::new(MavioEncoder::new(*conf.identity())),
        Box::new(MavioDecoder::new()),
        CancellationToken::new(),
    ))
}

fn autopilot() -> Endpoint<V2> {
    Endpoint::v2(MavLinkId::new(1, 1))
}

fn to_bytes(frame: Frame<V2>) -> Vec<u8> {
    let mut bytes = vec![0u8; frame.size()];
    frame.serialize(&mut bytes).unwrap();
    bytes
}

/// Flips a bit of the frame checksum.
pub fn corrupt_checksum(mut frame: Vec<u8>) -> Vec<u8> {
    let last = frame.len() - 1;
    frame[last] ^= 0x01;
    frame
}

/// `HEARTBEAT` as sent by the autopilot.
pub fn encode_heartbeat() -> Vec<u8> {
    let frame = autopilot()
        .next_frame(&Heartbeat {
            type_: MavType::FixedWing,
            autopilot: MavAutopilot::Generic,
            base_mode: Default::default(),
            custom_mode: 0,
            system_status: MavState::Active,
            mavlink_version: 3,
        })
        .unwrap();
    to_bytes(frame)
}

/// `COMMAND_ACK` for `command` with `result`.
pub fn encode_command_ack(command: MavCommand, result: MavResult) -> Vec<u8> {
    let frame = autopilot()
        .next_frame(&CommandAck {
            command: MavCmd::from(command),
            result,
            ..Default::default()
        })
        .unwrap();
    to_bytes(frame)
}

/// `GLOBAL_POSITION_INT` with coordinates in degrees and altitudes in meters.
pub fn encode_global_position(lat: f64, lon: f64, alt: f32, relative_alt: f32) -> Vec<u8> {
    let frame = autopilot()
        .next_frame(&GlobalPositionInt {
            time_boot_ms: 1000,
            lat: (lat * 1e7).round() as i32,
            lon: (lon * 1e7).round() as i32,
            alt: (alt * 1000.0).round() as i32,
            relative_alt: (relative_alt * 1000.0).round() as i32,
            hdg: u16::MAX,
            ..Default::default()
        })
        .unwrap();
    to_bytes(frame)
}

/// `LOCAL_POSITION_NED` at the origin.
pub fn encode_local_position() -> Vec<u8> {
    let frame = autopilot()
        .next_frame(&LocalPositionNed {
            time_boot_ms: 1000,
            ..Default::default()
        })
        .unwrap();
    to_bytes(frame)
}
