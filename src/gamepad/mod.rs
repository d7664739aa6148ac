//! Logitech F710 gamepad support
//!
//! This module provides the device-facing half of the bridge:
//! - USB HID transport (open by VID/PID, bounded reads)
//! - Input report decoding into typed controller state
//! - Change detection between state snapshots
//! - Scripted transport doubles for tests

pub mod constants;
pub mod types;
pub mod report;
pub mod diff;
pub mod device;
pub mod mock;

// Re-export commonly used items
pub use constants::*;
pub use types::*;
pub use report::*;
pub use diff::*;
pub use device::*;
