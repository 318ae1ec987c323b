//! USBtiny command protocol
//!
//! The programmer runs the USBtiny firmware command set: every operation is a
//! single vendor control-IN transfer whose `bRequest` is one of the
//! [`Opcode`]s below and whose `wValue`/`wIndex` carry the parameters.

use crate::error::{Error, Result};
use crate::programmer::ControlTransport;

/// USB vendor ID of USBtiny-class programmers
pub const USBTINY_VENDOR_ID: u16 = 0x1781;
/// USB product ID of USBtiny-class programmers
pub const USBTINY_PRODUCT_ID: u16 = 0x0C9F;

/// POWER_UP `wIndex`: hold target reset low
pub const RESET_LOW: u16 = 0;
/// POWER_UP `wIndex`: hold target reset high
pub const RESET_HIGH: u16 = 1;
/// Slowest SCK period accepted by POWER_UP
pub const SCK_MAX: u16 = 250;
/// Fastest SCK period accepted by POWER_UP
pub const SCK_MIN: u16 = 1;
/// SCK period used when powering up for EPROM work
///
/// 20 µs keeps the SPI link inside the timing margin of the programmer
/// firmware while it is busy pulsing older EPROM parts.
pub const SCK_EPROM: u16 = 20;

/// Response length of an SPI_EXCHANGE
pub const SPI_EXCHANGE_LEN: u16 = 4;

/// USBtiny request codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Echo `wValue`/`wIndex` back
    Echo = 0,
    /// Read port B pins
    ReadPins = 1,
    /// Write a byte to port B
    WritePins = 2,
    /// Clear a port B bit, `wValue` = bit number
    ClearBit = 3,
    /// Set a port B bit, `wValue` = bit number
    SetBit = 4,
    /// Apply power and enable buffers, `wValue` = SCK period, `wIndex` = reset level
    PowerUp = 5,
    /// Remove power and disable buffers
    PowerDown = 6,
    /// Four byte SPI exchange, `wValue` = b1b0, `wIndex` = b3b2
    SpiExchange = 7,
    /// Set poll bytes for flash writes
    PollBytes = 8,
    /// Read AVR flash
    FlashRead = 9,
    /// Write AVR flash
    FlashWrite = 10,
    /// Read AVR EEPROM
    EepromRead = 11,
    /// Write AVR EEPROM
    EepromWrite = 12,
    /// Set port B direction register
    SetDirection = 13,
    /// Single byte SPI exchange, `wValue` = byte
    SpiSingle = 14,
}

impl Opcode {
    /// Decode a request code
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Echo,
            1 => Self::ReadPins,
            2 => Self::WritePins,
            3 => Self::ClearBit,
            4 => Self::SetBit,
            5 => Self::PowerUp,
            6 => Self::PowerDown,
            7 => Self::SpiExchange,
            8 => Self::PollBytes,
            9 => Self::FlashRead,
            10 => Self::FlashWrite,
            11 => Self::EepromRead,
            12 => Self::EepromWrite,
            13 => Self::SetDirection,
            14 => Self::SpiSingle,
            _ => return None,
        })
    }
}

/// Command layer on top of a [`ControlTransport`]
///
/// Owns the transport for the lifetime of the session. Transfers are never
/// retried: most of these commands change programmer state (power, pins) and
/// repeating them blindly is not safe.
pub struct UsbTinyProtocol<T> {
    transport: T,
}

impl<T: ControlTransport> UsbTinyProtocol<T> {
    /// Wrap an open transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send one command and return exactly `expected_len` response bytes
    pub fn send(
        &mut self,
        opcode: Opcode,
        value: u16,
        index: u16,
        expected_len: u16,
    ) -> Result<Vec<u8>> {
        log::trace!(
            "usbtiny {:?} value=0x{:04X} index=0x{:04X} len={}",
            opcode,
            value,
            index,
            expected_len
        );

        let mut data = self
            .transport
            .control_in(opcode as u8, value, index, expected_len)?;

        if data.len() < expected_len as usize {
            return Err(Error::Transport(format!(
                "{:?}: expected {} bytes, got {}",
                opcode,
                expected_len,
                data.len()
            )));
        }
        data.truncate(expected_len as usize);
        Ok(data)
    }

    /// Power the target with the slow EPROM clock and reset held low
    pub fn power_on(&mut self) -> Result<()> {
        self.send(Opcode::PowerUp, SCK_EPROM, RESET_LOW, 0)?;
        Ok(())
    }

    /// Remove power from the target
    pub fn power_off(&mut self) -> Result<()> {
        self.send(Opcode::PowerDown, 0, 0, 0)?;
        Ok(())
    }

    /// Echo test; the firmware answers with the setup packet bytes
    pub fn echo(&mut self, value: u16, index: u16) -> Result<Vec<u8>> {
        self.send(Opcode::Echo, value, index, 8)
    }

    /// Read the port B pins
    pub fn read_pins(&mut self) -> Result<u8> {
        Ok(self.send(Opcode::ReadPins, 0, 0, 1)?[0])
    }

    /// Drive the port B pins
    pub fn write_pins(&mut self, bits: u8) -> Result<()> {
        self.send(Opcode::WritePins, bits as u16, 0, 0)?;
        Ok(())
    }

    /// Exchange one byte over SPI
    pub fn spi_single(&mut self, byte: u8) -> Result<u8> {
        Ok(self.send(Opcode::SpiSingle, byte as u16, 0, 1)?[0])
    }

    /// Exchange four bytes over SPI
    ///
    /// The programmer clocks out `value` low byte, `value` high byte,
    /// `index` low byte, `index` high byte, and returns the four bytes
    /// clocked in.
    pub fn spi_exchange(&mut self, value: u16, index: u16) -> Result<[u8; 4]> {
        let data = self.send(Opcode::SpiExchange, value, index, SPI_EXCHANGE_LEN)?;
        Ok([data[0], data[1], data[2], data[3]])
    }
}
