//! Protocol implementations
//!
//! Two layers sit on top of a [`ControlTransport`](crate::programmer::ControlTransport):
//! the USBtiny command set and the EPROM commands tunnelled through its SPI
//! exchange.

mod eprom;
mod usbtiny;

pub use eprom::*;
pub use usbtiny::*;
