//! USBtiny device implementation
//!
//! This module provides the `UsbTiny` struct that owns the claimed USB
//! interface and implements [`ControlTransport`] on top of it.

use std::time::Duration;

use nusb::transfer::{ControlIn, ControlType, Recipient};
use nusb::MaybeFuture;
use rprom_core::error::Result as CoreResult;
use rprom_core::programmer::ControlTransport;
use rprom_core::protocol::{USBTINY_PRODUCT_ID, USBTINY_VENDOR_ID};

use crate::error::{Result, UsbTinyError};

/// Timeout for a single control transfer
///
/// Commands return as soon as the firmware has queued them, so anything
/// longer than this means the programmer has gone away.
const TRANSFER_TIMEOUT: Duration = Duration::from_millis(500);

fn is_usbtiny(info: &nusb::DeviceInfo) -> bool {
    info.vendor_id() == USBTINY_VENDOR_ID && info.product_id() == USBTINY_PRODUCT_ID
}

/// USBtiny-class USB programmer
///
/// Holds interface 0 of the device for as long as it lives. Dropping it
/// releases the interface; it does not power down the target, which is the
/// workflow's job.
pub struct UsbTiny {
    interface: nusb::Interface,
    timeout: Duration,
}

impl UsbTiny {
    /// Open the first attached USBtiny
    pub fn open() -> Result<Self> {
        Self::open_nth(0)
    }

    /// Open the nth attached USBtiny (0-indexed)
    pub fn open_nth(index: usize) -> Result<Self> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| UsbTinyError::OpenFailed(e.to_string()))?
            .filter(is_usbtiny)
            .collect();

        let device_info = devices.get(index).ok_or(UsbTinyError::DeviceNotFound)?;

        log::info!(
            "Opening USBtiny {:04X}:{:04X} at address {}",
            device_info.vendor_id(),
            device_info.product_id(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| UsbTinyError::OpenFailed(e.to_string()))?;

        let interface = device
            .claim_interface(0)
            .wait()
            .map_err(|e| UsbTinyError::ClaimFailed(e.to_string()))?;

        Ok(Self {
            interface,
            timeout: TRANSFER_TIMEOUT,
        })
    }

    /// List all attached USBtiny devices
    pub fn list_devices() -> Result<Vec<UsbTinyDeviceInfo>> {
        let devices = nusb::list_devices()
            .wait()
            .map_err(|e| UsbTinyError::OpenFailed(e.to_string()))?
            .filter(is_usbtiny)
            .map(|d| UsbTinyDeviceInfo {
                address: d.device_address(),
                product: d.product_string().map(str::to_owned),
            })
            .collect();

        Ok(devices)
    }

    /// Override the per-transfer timeout
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn vendor_in(&self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length,
                },
                self.timeout,
            )
            .wait()
            .map_err(|e| {
                UsbTinyError::TransferFailed(format!("request {}: {}", request, e))
            })?;
        Ok(data)
    }
}

impl ControlTransport for UsbTiny {
    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        length: u16,
    ) -> CoreResult<Vec<u8>> {
        Ok(self.vendor_in(request, value, index, length)?)
    }
}

/// Information about an attached USBtiny
#[derive(Debug, Clone)]
pub struct UsbTinyDeviceInfo {
    /// USB device address
    pub address: u8,
    /// Product string, if the device reports one
    pub product: Option<String>,
}

impl std::fmt::Display for UsbTinyDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "USBtiny at address {}", self.address)?;
        if let Some(product) = &self.product {
            write!(f, " ({})", product)?;
        }
        Ok(())
    }
}
