//! Program, read and verify passes
//!
//! [`ProgramWorkflow`] sequences the EPROM controller for one complete pass
//! over a device: initialise, seek once, stream bytes with the device's
//! autoincrement pointer, and always finish with the shutdown sequence that
//! leaves the socket unpowered and deselected.

mod progress;
mod workflow;

pub use progress::*;
pub use workflow::*;
