//! Error types for rprom-core
//!
//! Every layer of the stack reports through the single [`Error`] enum so the
//! workflow boundary can match on the kind of failure. Programmer crates keep
//! their own error types and convert into this one at the transport seam.

use std::io;

use thiserror::Error;

use crate::hex::FormatError;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    // Transport errors
    /// No programmer with the given USB identifiers is attached
    #[error("programmer not found (VID:{vendor_id:04x} PID:{product_id:04x})")]
    DeviceNotFound {
        /// USB vendor ID searched for
        vendor_id: u16,
        /// USB product ID searched for
        product_id: u16,
    },
    /// A USB control transfer failed or returned a malformed answer
    #[error("USB transfer failed: {0}")]
    Transport(String),

    // Input errors
    /// Malformed Intel HEX input
    #[error("hex line {line}: {kind}")]
    Format {
        /// 1-based line number in the hex source
        line: usize,
        /// What was wrong with the line
        kind: FormatError,
    },
    /// Requested range does not fit the selected device
    #[error("range 0x{address:05X}+{length} exceeds device size of {size} bytes")]
    Capacity {
        /// First address of the requested range
        address: u32,
        /// Length of the requested range in bytes
        length: usize,
        /// Size of the selected device
        size: usize,
    },
    /// Invalid argument passed to an operation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Device errors
    /// The programmer reported a failed programming pulse
    #[error("programming failed at address 0x{address:05X}")]
    Programming {
        /// Address of the byte that failed to program
        address: u32,
    },
    /// Read-back data differs from what was written
    #[error("verify failed at 0x{address:05X}: expected 0x{expected:02X}, found 0x{found:02X}")]
    Verify {
        /// Address of the first mismatching byte
        address: u32,
        /// Byte that should be there
        expected: u8,
        /// Byte read from the device
        found: u8,
    },
    /// The device kept reporting busy under a bounded poll policy
    #[error("device still busy after {polls} status polls")]
    Timeout {
        /// Number of busy answers seen before giving up
        polls: u32,
    },
    /// The pass was stopped by an external interrupt
    #[error("operation interrupted")]
    Interrupted,

    // I/O errors
    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error came from the USB layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::DeviceNotFound { .. } | Self::Transport(_))
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
