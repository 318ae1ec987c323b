//! Error types for the USBtiny transport

use std::fmt;

use rprom_core::protocol::{USBTINY_PRODUCT_ID, USBTINY_VENDOR_ID};

/// Result type for USBtiny operations
pub type Result<T> = std::result::Result<T, UsbTinyError>;

/// Errors that can occur when talking to a USBtiny programmer
#[derive(Debug)]
pub enum UsbTinyError {
    /// Device not found
    DeviceNotFound,
    /// Failed to enumerate or open the device
    OpenFailed(String),
    /// Failed to claim interface
    ClaimFailed(String),
    /// USB transfer failed
    TransferFailed(String),
}

impl fmt::Display for UsbTinyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsbTinyError::DeviceNotFound => write!(
                f,
                "USBtiny device not found (VID:{:04x} PID:{:04x})",
                USBTINY_VENDOR_ID, USBTINY_PRODUCT_ID
            ),
            UsbTinyError::OpenFailed(msg) => write!(f, "Failed to open USBtiny: {}", msg),
            UsbTinyError::ClaimFailed(msg) => write!(f, "Failed to claim interface: {}", msg),
            UsbTinyError::TransferFailed(msg) => write!(f, "USB transfer failed: {}", msg),
        }
    }
}

impl std::error::Error for UsbTinyError {}

impl From<nusb::Error> for UsbTinyError {
    fn from(e: nusb::Error) -> Self {
        UsbTinyError::TransferFailed(e.to_string())
    }
}

impl From<UsbTinyError> for rprom_core::Error {
    fn from(e: UsbTinyError) -> Self {
        match e {
            UsbTinyError::DeviceNotFound => rprom_core::Error::DeviceNotFound {
                vendor_id: USBTINY_VENDOR_ID,
                product_id: USBTINY_PRODUCT_ID,
            },
            other => rprom_core::Error::Transport(other.to_string()),
        }
    }
}
