//! Gamepad bridge - main application
//!
//! Opens the configured USB gamepad and publishes its state to data-layer
//! nodes until the acquisition loop stops. Exit code 0 on graceful
//! shutdown, non-zero on a fatal acquisition failure.

use anyhow::Context;
use log::{error, info};
use padbridge_rs::bridge::{Bridge, BridgeHandle};
use padbridge_rs::config::Config;
use padbridge_rs::datalayer::{LoggingNodeStore, NodePublisher};
use padbridge_rs::gamepad::device::UsbOpener;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    // Optional single argument: an explicit config file path
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading config '{path}'"))?,
        None => Config::load_default().context("loading default config")?,
    };

    let opener = UsbOpener::new(config.device.vendor_id, config.device.product_ids.clone())
        .context("initializing USB HID transport")?;
    let publisher = NodePublisher::new(LoggingNodeStore, &config.datalayer.root);
    let bridge = Bridge::new(opener, publisher, config.acquisition.clone());

    let handle = BridgeHandle::spawn(bridge).context("spawning acquisition thread")?;
    info!(
        "bridge started, publishing under '{}'",
        config.datalayer.root
    );

    loop {
        if let Some(result) = handle.wait_timeout(Duration::from_secs(1)) {
            result.context("acquisition loop failed")?;
            return Ok(());
        }
    }
}
