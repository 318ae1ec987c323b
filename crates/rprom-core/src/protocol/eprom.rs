//! EPROM command layer
//!
//! The programmer firmware accepts EPROM commands as four byte SPI frames:
//! `code, address_hi, address_lo, data`. On the USB side that frame is one
//! SPI_EXCHANGE with
//!
//! - `wValue = (address & 0xFF00) | code`
//! - `wIndex = (data << 8) | (address & 0x00FF)`
//!
//! The answer is four bytes as well. Byte 2 is the status byte (see
//! [`DeviceStatus`]), byte 3 is the data latched at the device's current
//! address.
//!
//! Commands that change device state are queued by the firmware and
//! processed in its main loop. The host must poll STATUS until the busy bit
//! clears before sending the next command; [`EpromController`] does that
//! after every mutating command.

use bitflags::bitflags;

use crate::device::Vpp;
use crate::error::{Error, Result};
use crate::programmer::ControlTransport;

use super::usbtiny::UsbTinyProtocol;

/// EPROM command codes understood by the programmer firmware
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpromCommand {
    /// Reset the address register and clear the error flag
    Reset = 0,
    /// Read the status byte
    Status = 1,
    /// Load the address register
    Seek = 2,
    /// Select the device type (0 disables the socket)
    SetType = 3,
    /// Select the programming voltage
    SetVpp = 4,
    /// Program the byte at the current address
    Write = 5,
    /// Read the byte at the current address
    Read = 6,
    /// Program the byte at the current address, then advance
    WriteAutoincrement = 7,
    /// Read the byte at the current address, then advance
    ReadAutoincrement = 8,
    /// Switch the activity LED
    SetLed = 9,
}

impl EpromCommand {
    /// Decode a command code
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Reset,
            1 => Self::Status,
            2 => Self::Seek,
            3 => Self::SetType,
            4 => Self::SetVpp,
            5 => Self::Write,
            6 => Self::Read,
            7 => Self::WriteAutoincrement,
            8 => Self::ReadAutoincrement,
            9 => Self::SetLed,
            _ => return None,
        })
    }

    /// Whether the firmware queues this command and reports busy until done
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::Seek
                | Self::SetType
                | Self::SetVpp
                | Self::SetLed
                | Self::Write
                | Self::WriteAutoincrement
        )
    }

    /// Pack command, address and data into SPI_EXCHANGE `(value, index)`
    pub fn pack(self, address: u16, data: u8) -> (u16, u16) {
        let value = (address & 0xFF00) | self as u16;
        let index = ((data as u16) << 8) | (address & 0x00FF);
        (value, index)
    }

    /// Inverse of [`pack`](Self::pack): `(command code, address, data)`
    pub fn unpack(value: u16, index: u16) -> (u8, u16, u8) {
        let code = (value & 0x00FF) as u8;
        let address = (value & 0xFF00) | (index & 0x00FF);
        let data = (index >> 8) as u8;
        (code, address, data)
    }
}

/// Offset of the status byte in an SPI_EXCHANGE response
pub const STATUS_BYTE: usize = 2;
/// Offset of the data byte in an SPI_EXCHANGE response
pub const DATA_BYTE: usize = 3;

bitflags! {
    /// Programmer status byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceStatus: u8 {
        /// Commands are still queued in the firmware
        const BUSY  = 1 << 0;
        /// The last programming pulse did not stick
        const ERROR = 1 << 1;
    }
}

/// How long to keep polling a busy device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    /// Poll until the device is ready, however long that takes
    ///
    /// The firmware programs with a fixed pulse width and always comes back;
    /// a device that never does needs a power cycle anyway.
    #[default]
    Unbounded,
    /// Give up with [`Error::Timeout`] after this many busy answers
    Bounded {
        /// Maximum number of busy answers to accept
        max_polls: u32,
    },
}

/// EPROM controller
///
/// Encodes EPROM commands onto the USBtiny protocol and implements the
/// busy-wait after every mutating command. It never aborts on its own when
/// the error flag is set; callers query [`is_error`](Self::is_error).
pub struct EpromController<T> {
    protocol: UsbTinyProtocol<T>,
    poll_policy: PollPolicy,
}

impl<T: ControlTransport> EpromController<T> {
    /// Create a controller that owns the given transport
    pub fn new(transport: T) -> Self {
        Self::from_protocol(UsbTinyProtocol::new(transport))
    }

    /// Create a controller on an existing protocol session
    pub fn from_protocol(protocol: UsbTinyProtocol<T>) -> Self {
        Self {
            protocol,
            poll_policy: PollPolicy::Unbounded,
        }
    }

    /// Replace the busy-wait policy
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Current busy-wait policy
    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    /// Borrow the protocol layer
    pub fn protocol(&self) -> &UsbTinyProtocol<T> {
        &self.protocol
    }

    /// Mutably borrow the protocol layer
    pub fn protocol_mut(&mut self) -> &mut UsbTinyProtocol<T> {
        &mut self.protocol
    }

    /// Give the transport back
    pub fn into_inner(self) -> T {
        self.protocol.into_inner()
    }

    /// Send one EPROM command and return the raw response
    pub fn command(&mut self, cmd: EpromCommand, address: u16, data: u8) -> Result<[u8; 4]> {
        let (value, index) = cmd.pack(address, data);
        self.protocol.spi_exchange(value, index)
    }

    /// Send a mutating command and wait until the firmware has processed it
    fn command_wait(&mut self, cmd: EpromCommand, address: u16, data: u8) -> Result<()> {
        self.command(cmd, address, data)?;
        self.wait_ready()
    }

    /// Apply power to the programmer's target side
    pub fn power_on(&mut self) -> Result<()> {
        self.protocol.power_on()
    }

    /// Remove power from the target side
    pub fn power_off(&mut self) -> Result<()> {
        self.protocol.power_off()
    }

    /// Reset the address register and clear the error flag
    pub fn reset(&mut self) -> Result<()> {
        self.command(EpromCommand::Reset, 0, 0)?;
        Ok(())
    }

    /// Read a fresh status byte
    pub fn status(&mut self) -> Result<DeviceStatus> {
        let resp = self.command(EpromCommand::Status, 0, 0)?;
        Ok(DeviceStatus::from_bits_truncate(resp[STATUS_BYTE]))
    }

    /// Whether the firmware still has commands queued
    pub fn is_busy(&mut self) -> Result<bool> {
        Ok(self.status()?.contains(DeviceStatus::BUSY))
    }

    /// Whether the last programming pulse failed
    pub fn is_error(&mut self) -> Result<bool> {
        Ok(self.status()?.contains(DeviceStatus::ERROR))
    }

    /// Poll STATUS until the busy bit clears
    pub fn wait_ready(&mut self) -> Result<()> {
        let mut polls = 0u32;
        while self.is_busy()? {
            polls += 1;
            if let PollPolicy::Bounded { max_polls } = self.poll_policy {
                if polls >= max_polls {
                    return Err(Error::Timeout { polls });
                }
            }
        }
        Ok(())
    }

    /// Load the device address register
    pub fn seek(&mut self, address: u16) -> Result<()> {
        log::debug!("seek 0x{:04X}", address);
        self.command_wait(EpromCommand::Seek, address, 0)
    }

    /// Select the device type code (0 disables the socket)
    pub fn set_type(&mut self, type_code: u8) -> Result<()> {
        log::debug!("set type {}", type_code);
        self.command_wait(EpromCommand::SetType, 0, type_code)
    }

    /// Select the programming voltage
    pub fn set_vpp(&mut self, vpp: Vpp) -> Result<()> {
        log::debug!("set VPP {}", vpp);
        self.command_wait(EpromCommand::SetVpp, 0, vpp.code())
    }

    /// Switch the activity LED
    pub fn set_led(&mut self, on: bool) -> Result<()> {
        self.command_wait(EpromCommand::SetLed, 0, on as u8)
    }

    /// Program `byte` at the current address without advancing
    pub fn write(&mut self, byte: u8) -> Result<()> {
        self.command_wait(EpromCommand::Write, 0, byte)
    }

    /// Read the byte at the current address without advancing
    pub fn read(&mut self) -> Result<u8> {
        Ok(self.command(EpromCommand::Read, 0, 0)?[DATA_BYTE])
    }

    /// Program `byte` at the current address, then advance by one
    pub fn write_autoincrement(&mut self, byte: u8) -> Result<()> {
        self.command_wait(EpromCommand::WriteAutoincrement, 0, byte)
    }

    /// Read the byte at the current address, then advance by one
    pub fn read_autoincrement(&mut self) -> Result<u8> {
        Ok(self.command(EpromCommand::ReadAutoincrement, 0, 0)?[DATA_BYTE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Opcode;
    use std::collections::VecDeque;

    /// Answers STATUS from a scripted list of status bytes
    struct Scripted {
        statuses: VecDeque<u8>,
        commands: Vec<(u8, u16, u8)>,
        data: u8,
    }

    impl Scripted {
        fn new(statuses: &[u8]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
                commands: Vec::new(),
                data: 0,
            }
        }
    }

    impl ControlTransport for Scripted {
        fn control_in(
            &mut self,
            request: u8,
            value: u16,
            index: u16,
            _length: u16,
        ) -> Result<Vec<u8>> {
            if request != Opcode::SpiExchange as u8 {
                return Ok(Vec::new());
            }
            let (code, address, data) = EpromCommand::unpack(value, index);
            self.commands.push((code, address, data));
            let status = if code == EpromCommand::Status as u8 {
                self.statuses.pop_front().unwrap_or(0)
            } else {
                0
            };
            Ok(vec![0, 0, status, self.data])
        }
    }

    fn codes(ctl: &EpromController<Scripted>) -> Vec<u8> {
        ctl.protocol().transport().commands.iter().map(|c| c.0).collect()
    }

    #[test]
    fn test_pack_layout() {
        assert_eq!(EpromCommand::Seek.pack(0x1234, 0), (0x1202, 0x0034));
        assert_eq!(EpromCommand::SetType.pack(0, 4), (0x0003, 0x0400));
        assert_eq!(
            EpromCommand::WriteAutoincrement.pack(0xFFFF, 0xA5),
            (0xFF07, 0xA5FF)
        );
    }

    #[test]
    fn test_pack_unpack() {
        for code in 0..=9u8 {
            let cmd = EpromCommand::from_code(code).unwrap();
            for &(address, data) in &[(0u16, 0u8), (0x1234, 0x56), (0xFFFF, 0xFF), (0x00FF, 1)] {
                let (value, index) = cmd.pack(address, data);
                assert_eq!(EpromCommand::unpack(value, index), (code, address, data));
            }
        }
        assert_eq!(EpromCommand::from_code(10), None);
    }

    #[test]
    fn test_status_bits() {
        let mut ctl = EpromController::new(Scripted::new(&[0x01, 0x02, 0x03]));
        assert!(ctl.is_busy().unwrap());
        assert!(ctl.is_error().unwrap());
        assert_eq!(ctl.status().unwrap(), DeviceStatus::BUSY | DeviceStatus::ERROR);
    }

    #[test]
    fn test_mutating_commands_wait() {
        // Two busy answers, then ready
        let mut ctl = EpromController::new(Scripted::new(&[1, 1, 0]));
        ctl.seek(0x0100).unwrap();
        assert_eq!(codes(&ctl), vec![2, 1, 1, 1]);
    }

    #[test]
    fn test_reads_do_not_wait() {
        let mut ctl = EpromController::new(Scripted::new(&[1, 1, 1]));
        ctl.protocol_mut().transport_mut().data = 0x5A;
        assert_eq!(ctl.read_autoincrement().unwrap(), 0x5A);
        assert_eq!(ctl.read().unwrap(), 0x5A);
        ctl.reset().unwrap();
        assert_eq!(codes(&ctl), vec![8, 6, 0]);
    }

    #[test]
    fn test_bounded_poll_times_out() {
        let mut ctl = EpromController::new(Scripted::new(&[1; 10]))
            .with_poll_policy(PollPolicy::Bounded { max_polls: 3 });
        let err = ctl.set_led(true).unwrap_err();
        assert!(matches!(err, Error::Timeout { polls: 3 }));
    }

    #[test]
    fn test_set_vpp_code() {
        let mut ctl = EpromController::new(Scripted::new(&[]));
        ctl.set_vpp(Vpp::V21).unwrap();
        assert_eq!(ctl.protocol().transport().commands[0], (4, 0, 2));
    }
}
