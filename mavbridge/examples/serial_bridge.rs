use std::time::Duration;

use mavbridge::prelude::*;

#[cfg(target_os = "windows")]
const DEVICE_PREFIX: &str = "COM";
#[cfg(target_os = "macos")]
const DEVICE_PREFIX: &str = "/dev/tty.usbmodem";
#[cfg(target_os = "linux")]
const DEVICE_PREFIX: &str = "/dev/ttyACM";
#[cfg(all(not(target_os = "macos"), not(target_os = "linux"), unix))]
const DEVICE_PREFIX: &str = "/dev/tty";
const BAUD_RATE: u32 = 115_200;
const N_TARGETS: usize = 10;
const TARGET_INTERVAL: Duration = Duration::from_millis(500);

fn lookup() -> Option<String> {
    let ports = tokio_serial::available_ports().ok()?;
    log::warn!(
        "Got ports: {:?}",
        ports
            .iter()
            .map(|p| p.port_name.clone())
            .collect::<Vec<_>>()
    );
    ports
        .into_iter()
        .map(|port| port.port_name)
        .find(|name| name.starts_with(DEVICE_PREFIX))
}

async fn run(path: &str) -> Result<()> {
    log::warn!("[bridge] connecting to {}", path);

    let port = SerialPort::new(path, BAUD_RATE);
    let stream = port
        .open()
        .map_err(|err| Error::with_source(ErrorKind::FailedRead, err))?;
    let bridge = Bridge::new(BridgeConf::default(), stream);

    match bridge.init().await {
        Ok(()) => log::warn!("[bridge] autopilot configured and rebooted"),
        // Autopilot may drop the link while rebooting
        Err(err) if err.kind() == ErrorKind::ReceiveTimeout => {
            log::warn!("[bridge] no reply after reboot, continuing")
        }
        Err(err) => return Err(err),
    }

    let heartbeats = match bridge.spawn_heartbeat_loop(bridge.conf().heartbeat_interval()) {
        Ok(heartbeats) => Some(heartbeats),
        Err(err) => {
            log::warn!("[bridge] heartbeats are not running: {err}");
            None
        }
    };

    bridge.arm().await?;
    bridge.set_guided_mode().await?;
    log::warn!("[bridge] vehicle state: {}", bridge.vehicle_state().await);

    for _ in 0..N_TARGETS {
        bridge.set_target_position_local([1.0, 0.0, 0.0]).await?;
        tokio::time::sleep(TARGET_INTERVAL).await;
    }

    let position = bridge.get_position_global().await?;
    log::warn!("[bridge] global position: {position:?}");

    bridge.disarm().await?;
    bridge.shutdown();

    if let Some(heartbeats) = heartbeats {
        if let Some(err) = heartbeats.stopped().await {
            log::error!("[bridge] heartbeats failed: {err}");
        }
    }

    log::warn!("[bridge] finished");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Setup logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Info) // Suppress everything below `info` for third-party modules.
        .filter_module(env!("CARGO_PKG_NAME"), log::LevelFilter::Info) // Log level for current package
        .init();

    run(&lookup().expect("No available ports")).await.unwrap();
}
