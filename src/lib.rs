//! padbridge-rs: USB Gamepad to Data-Layer Bridge
//!
//! This library reads raw HID input reports from a Logitech F710 gamepad,
//! decodes them into typed controller state, and publishes changed values
//! to named data-layer nodes.

pub mod bridge;
pub mod config;
pub mod datalayer;
pub mod gamepad;

// Re-export commonly used items
pub use bridge::{Bridge, BridgeError, BridgeHandle, BridgePhase};
pub use config::Config;
pub use datalayer::{NodePublisher, NodeStore, NodeValue};
pub use gamepad::{decode_report, diff, Button, DpadDirection, Field, PadState};
