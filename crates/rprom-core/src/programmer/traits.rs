//! Programmer trait definitions

use crate::error::Result;

/// USB vendor control-IN transport
///
/// This is the only thing the protocol stack needs from a programmer
/// backend: issue a vendor-class, device-recipient, device-to-host control
/// transfer and hand back what the device answered.
///
/// `request`, `value` and `index` map 1:1 onto the setup packet's
/// `bRequest`, `wValue` and `wIndex`. `length` is the number of bytes the
/// caller expects; implementations return what the device actually sent and
/// leave length checking to the caller.
///
/// ## Example
///
/// ```ignore
/// impl ControlTransport for MyProgrammer {
///     fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
///         self.usb.vendor_in(request, value, index, length).map_err(Into::into)
///     }
/// }
/// ```
pub trait ControlTransport {
    /// Issue a single vendor control-IN transfer
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>>;
}

// Allow boxed transports so the CLI can pick a backend at runtime
impl ControlTransport for Box<dyn ControlTransport + Send> {
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        (**self).control_in(request, value, index, length)
    }
}

impl<T: ControlTransport + ?Sized> ControlTransport for &mut T {
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        (**self).control_in(request, value, index, length)
    }
}
