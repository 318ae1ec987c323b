//! EPROM device profiles and programming voltages
//!
//! This module describes the parts the programmer can drive, and the
//! database used to look them up by name.

mod database;
mod types;

pub use database::*;
pub use types::*;
