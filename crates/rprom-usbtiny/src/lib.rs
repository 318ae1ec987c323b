//! rprom-usbtiny - USBtiny programmer transport
//!
//! This crate opens a USBtiny-class programmer (VID:1781 PID:0c9f) with
//! `nusb` and exposes it as a [`ControlTransport`] for the EPROM protocol
//! stack in `rprom-core`.
//!
//! Every USBtiny command is a single vendor control-IN transfer, so the
//! transport is nothing more than a claimed interface and a timeout.
//!
//! # Example
//!
//! ```no_run
//! use rprom_core::protocol::EpromController;
//! use rprom_usbtiny::UsbTiny;
//!
//! let usbtiny = UsbTiny::open()?;
//! let mut controller = EpromController::new(usbtiny);
//! controller.power_on()?;
//! println!("status: {:?}", controller.status()?);
//! controller.power_off()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`ControlTransport`]: rprom_core::programmer::ControlTransport

mod device;
mod error;

pub use device::{UsbTiny, UsbTinyDeviceInfo};
pub use error::{Result, UsbTinyError};
