use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::asnc::commander::PositionCommander;
use crate::asnc::heartbeat::{send_heartbeat, HeartbeatEmitter, HeartbeatHandle};
use crate::asnc::link::Link;
use crate::asnc::sequencer::CommandSequencer;
use crate::asnc::vehicle::VehicleController;
use crate::core::{BridgeConf, VehicleCommand, VehicleState};
use crate::errors::{Error, ErrorKind, Result};
use crate::protocol::{FrameDecoder, FrameEncoder, GlobalPosition, MavioDecoder, MavioEncoder};

/// Asynchronous MAVLink bridge between a companion computer and an autopilot.
///
/// [`Bridge`] owns a single transport shared by all operations. It is cheap to clone, all clones
/// refer to the same link, vehicle state and cancellation token.
///
/// # Usage
///
/// ```rust,no_run
/// # #[tokio::main] async fn main() -> mavbridge::errors::Result<()> {
/// use mavbridge::asnc::Bridge;
/// use mavbridge::core::BridgeConf;
///
/// let (transport, _autopilot) = tokio::io::duplex(1024);
/// let bridge = Bridge::new(BridgeConf::default(), transport);
///
/// bridge.init().await?;
/// let heartbeats = bridge.spawn_heartbeat_loop(bridge.conf().heartbeat_interval())?;
///
/// bridge.arm().await?;
/// bridge.set_guided_mode().await?;
/// bridge.set_target_position_local([1.0, 0.0, 0.0]).await?;
///
/// bridge.shutdown();
/// assert!(heartbeats.stopped().await.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    conf: Arc<BridgeConf>,
    link: Arc<Link>,
    commander: PositionCommander,
    vehicle: VehicleController,
    init_lock: Mutex<()>,
    initialized: AtomicBool,
    cancel: CancellationToken,
}

impl Bridge {
    /// Creates bridge over `transport` using the default `mavio` codec.
    ///
    /// Nothing is sent until the first operation is called.
    pub fn new<T>(conf: BridgeConf, transport: T) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let encoder = MavioEncoder::new(*conf.identity());
        Self::with_codec(conf, transport, encoder, MavioDecoder::new())
    }

    /// Creates bridge over `transport` with custom frame `encoder` and `decoder`.
    pub fn with_codec<T, E, D>(conf: BridgeConf, transport: T, encoder: E, decoder: D) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
        E: FrameEncoder,
        D: FrameDecoder,
    {
        let conf = Arc::new(conf);
        let cancel = CancellationToken::new();
        let (reader, writer) = tokio::io::split(transport);

        let link = Arc::new(Link::new(
            conf.clone(),
            Box::new(reader),
            Box::new(writer),
            Box::new(encoder),
            Box::new(decoder),
            cancel.clone(),
        ));

        Self {
            inner: Arc::new(BridgeInner {
                conf,
                commander: PositionCommander::new(link.clone()),
                vehicle: VehicleController::new(link.clone()),
                link,
                init_lock: Mutex::new(()),
                initialized: AtomicBool::new(false),
                cancel,
            }),
        }
    }

    /// Bridge configuration.
    pub fn conf(&self) -> &BridgeConf {
        self.inner.conf.as_ref()
    }

    /// Runs the initialization sequence.
    ///
    /// Pins all telemetry stream rates, reboots the autopilot and waits for acknowledgment. Once
    /// succeeded, subsequent calls return `Ok(())` without sending anything. After a failure the
    /// sequence may be run again.
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::FailedWrite`] or [`ErrorKind::TransmitTimeout`] if any command can't be
    ///   sent, the remaining commands are not attempted.
    /// * [`ErrorKind::NoCommandAck`] if the reply to the reboot is not an acknowledgment.
    /// * [`ErrorKind::ReceiveTimeout`] if there is no reply within [`BridgeConf::ack_timeout`].
    pub async fn init(&self) -> Result<()> {
        let _guard = self.inner.init_lock.lock().await;
        if self.is_initialized() {
            log::debug!("bridge is already initialized, skipping");
            return Ok(());
        }

        CommandSequencer::new(self.inner.link.clone()).run().await?;

        self.inner.initialized.store(true, Ordering::Release);
        log::info!("bridge initialized");
        Ok(())
    }

    /// Returns `true` if [`Bridge::init`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    /// Sends a single heartbeat.
    ///
    /// Unlike other steady-state operations, available before [`Bridge::init`]. A failed
    /// heartbeat does not affect subsequent calls.
    pub async fn heartbeat(&self) -> Result<()> {
        send_heartbeat(&self.inner.link).await
    }

    /// Spawns a task that sends heartbeats every `interval`.
    ///
    /// The loop stops on the first failure, on [`HeartbeatHandle::stop`], or when the bridge is
    /// shut down. Must be called within a `tokio` runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidState`] if the bridge is not initialized.
    pub fn spawn_heartbeat_loop(&self, interval: Duration) -> Result<HeartbeatHandle> {
        self.require_initialized("heartbeat loop")?;

        let emitter = HeartbeatEmitter {
            link: self.inner.link.clone(),
            interval,
            cancel: self.inner.cancel.child_token(),
        };
        log::debug!("spawning heartbeat loop, interval: {interval:?}");
        Ok(emitter.spawn())
    }

    /// Sends a position target relative to the current vehicle position (meters, NED).
    ///
    /// This and other steady-state operations below fail with [`ErrorKind::InvalidState`] until
    /// [`Bridge::init`] has succeeded.
    pub async fn set_target_position_local(&self, position: [f32; 3]) -> Result<()> {
        self.require_initialized("position target")?;
        self.inner.commander.set_target_position_local(position).await
    }

    /// Sends a velocity target (meters per second, NED).
    pub async fn set_target_velocity_local(&self, velocity: [f32; 3]) -> Result<()> {
        self.require_initialized("velocity target")?;
        self.inner.commander.set_target_velocity_local(velocity).await
    }

    /// Sends a heading target (radians).
    pub async fn set_target_heading_local(&self, yaw: f32) -> Result<()> {
        self.require_initialized("heading target")?;
        self.inner.commander.set_target_heading_local(yaw).await
    }

    /// Requests and awaits the current global position of the vehicle.
    pub async fn get_position_global(&self) -> Result<GlobalPosition> {
        self.require_initialized("position query")?;
        self.inner.commander.get_position_global().await
    }

    /// Arms motors.
    pub async fn arm(&self) -> Result<()> {
        self.request(VehicleCommand::Arm).await
    }

    /// Disarms motors.
    pub async fn disarm(&self) -> Result<()> {
        self.request(VehicleCommand::Disarm).await
    }

    /// Switches armed vehicle to guided mode.
    pub async fn set_guided_mode(&self) -> Result<()> {
        self.request(VehicleCommand::Guided).await
    }

    /// Vehicle state as confirmed by the autopilot.
    pub async fn vehicle_state(&self) -> VehicleState {
        self.inner.vehicle.state().await
    }

    /// Token that is cancelled when the bridge shuts down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Interrupts all pending operations and stops the heartbeat loop.
    ///
    /// Operations called after shutdown fail with [`ErrorKind::Cancelled`].
    pub fn shutdown(&self) {
        log::debug!("shutting down bridge");
        self.inner.cancel.cancel();
    }

    async fn request(&self, command: VehicleCommand) -> Result<()> {
        self.require_initialized("vehicle command")?;
        self.inner.vehicle.request(command).await.map(|_| ())
    }

    fn require_initialized(&self, operation: &str) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        Err(Error::with_source(
            ErrorKind::InvalidState,
            format!("{operation} requires initialized bridge"),
        ))
    }
}
