//! rprom-core - Core library for parallel EPROM programming
//!
//! This crate drives a USBtiny-class programmer whose firmware tunnels EPROM
//! commands through the USBtiny SPI exchange. It is transport agnostic: a
//! backend only has to implement [`programmer::ControlTransport`].
//!
//! The layers, bottom up:
//!
//! - [`protocol`] - USBtiny opcodes and the EPROM command set with busy-wait
//! - [`hex`] - streaming Intel HEX decoder
//! - [`device`] - device profiles, programming voltages and the device database
//! - [`program`] - write, read and verify passes with guaranteed shutdown
//!
//! # Example
//!
//! ```ignore
//! use rprom_core::device::DeviceDatabase;
//! use rprom_core::program::{NoProgress, ProgramWorkflow};
//! use rprom_core::protocol::EpromController;
//!
//! let db = DeviceDatabase::builtin();
//! let profile = db.find("27256").unwrap();
//! let mut controller = EpromController::new(transport);
//! let image = ProgramWorkflow::new(&mut controller, profile).read(0, None, &mut NoProgress)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod device;
pub mod error;
pub mod hex;
pub mod program;
pub mod programmer;
pub mod protocol;

pub use error::{Error, Result};
