//! USB HID transport
//!
//! This module owns the connection to the physical pad: finding it by
//! vendor/product id, reading raw input reports with a bounded timeout, and
//! releasing the handle. The acquisition loop talks to it exclusively
//! through the [`ReportSource`]/[`SourceOpener`] traits so it can run
//! against scripted doubles in tests.

use hidapi::{HidApi, HidDevice};
use log::{debug, info};
use std::time::Duration;
use thiserror::Error;

/// Largest report any supported device emits; reads are sliced to the
/// actual length returned by the transport.
const READ_BUF_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no supported gamepad found (vendor 0x{vendor_id:04X})")]
    NotFound { vendor_id: u16 },

    #[error("USB transport failure: {0}")]
    Io(String),
}

/// Blocking "read next report" primitive with a bounded timeout.
///
/// `Ok(None)` means the timeout elapsed with no new input — an expected,
/// non-error condition.
pub trait ReportSource {
    fn read_report(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Factory for report sources, used both at startup and when the loop
/// re-opens the device after a read failure.
pub trait SourceOpener {
    type Source: ReportSource;

    fn open(&mut self) -> Result<Self::Source, TransportError>;
}

/// An opened USB gamepad. The underlying handle is released on drop.
pub struct UsbGamepad {
    device: HidDevice,
}

impl UsbGamepad {
    /// Try each product id in order and claim the first device that opens.
    pub fn open(api: &HidApi, vendor_id: u16, product_ids: &[u16]) -> Result<Self, TransportError> {
        for &product_id in product_ids {
            match api.open(vendor_id, product_id) {
                Ok(device) => {
                    info!(
                        "opened gamepad 0x{:04X}:0x{:04X} ({})",
                        vendor_id,
                        product_id,
                        device
                            .get_product_string()
                            .ok()
                            .flatten()
                            .unwrap_or_else(|| "unknown product".to_string())
                    );
                    return Ok(Self { device });
                }
                Err(e) => {
                    debug!(
                        "no device at 0x{:04X}:0x{:04X}: {}",
                        vendor_id, product_id, e
                    );
                }
            }
        }
        Err(TransportError::NotFound { vendor_id })
    }
}

impl ReportSource for UsbGamepad {
    fn read_report(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        let mut buf = [0u8; READ_BUF_LEN];
        let millis = timeout.as_millis().min(i32::MAX as u128) as i32;

        match self.device.read_timeout(&mut buf, millis) {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(buf[..n].to_vec())),
            Err(e) => Err(TransportError::Io(e.to_string())),
        }
    }
}

/// Opens [`UsbGamepad`] sources for a configured vendor/product id set.
pub struct UsbOpener {
    api: HidApi,
    vendor_id: u16,
    product_ids: Vec<u16>,
}

impl UsbOpener {
    pub fn new(vendor_id: u16, product_ids: Vec<u16>) -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(Self {
            api,
            vendor_id,
            product_ids,
        })
    }
}

impl SourceOpener for UsbOpener {
    type Source = UsbGamepad;

    fn open(&mut self) -> Result<UsbGamepad, TransportError> {
        // Re-enumerate so a receiver that was re-plugged since the last
        // attempt is visible.
        self.api
            .refresh_devices()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        UsbGamepad::open(&self.api, self.vendor_id, &self.product_ids)
    }
}
