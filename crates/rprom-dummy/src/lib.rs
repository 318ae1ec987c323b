//! rprom-dummy - In-memory EPROM programmer emulator for testing
//!
//! This crate provides a dummy programmer that answers the USBtiny command
//! set the way the EPROM firmware does, backed by an in-memory EPROM. It's
//! useful for testing and development without real hardware.
//!
//! The emulated part behaves like a UV EPROM: programming can only clear
//! bits, so writing a byte over non-blank contents sets the error flag.

use rprom_core::error::{Error, Result};
use rprom_core::programmer::ControlTransport;
use rprom_core::protocol::{DeviceStatus, EpromCommand, Opcode, DATA_BYTE, STATUS_BYTE};

/// Configuration for the dummy programmer
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Emulated EPROM size in bytes
    pub size: usize,
    /// Busy answers to STATUS after every queued command
    pub busy_polls: u32,
    /// Make the nth write command (1-based) fail to program
    pub fail_write_at: Option<usize>,
    /// Report busy forever once a command has been queued
    pub stuck_busy: bool,
    /// Fail every transfer after this many have succeeded
    pub disconnect_after: Option<usize>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            size: 64 * 1024, // 27512
            busy_polls: 1,
            fail_write_at: None,
            stuck_busy: false,
            disconnect_after: None,
        }
    }
}

/// What the emulator saw on the wire
///
/// STATUS polls are not recorded; see [`DummyEprom::status_polls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// POWER_UP with SCK period and reset level
    PowerUp {
        /// SCK period from `wValue`
        sck: u16,
        /// Reset level from `wIndex`
        reset: u16,
    },
    /// POWER_DOWN
    PowerDown,
    /// An EPROM command tunnelled through SPI_EXCHANGE
    Eprom {
        /// Decoded command
        command: EpromCommand,
        /// Address field
        address: u16,
        /// Data field
        data: u8,
    },
}

/// Dummy USBtiny programmer with an EPROM in the socket
pub struct DummyEprom {
    config: DummyConfig,
    data: Vec<u8>,
    address: u16,
    powered: bool,
    device_type: u8,
    vpp: u8,
    led: bool,
    error: bool,
    busy_remaining: u32,
    transfers: usize,
    writes: usize,
    status_polls: usize,
    trace: Vec<Event>,
}

impl DummyEprom {
    /// Create a new dummy programmer with a blank EPROM
    ///
    /// An empty socket cannot be emulated, so a zero `size` is rejected.
    pub fn new(config: DummyConfig) -> Result<Self> {
        if config.size == 0 {
            return Err(Error::InvalidArgument(
                "dummy EPROM size must be non-zero".into(),
            ));
        }
        Ok(Self::blank(config))
    }

    fn blank(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            address: 0,
            powered: false,
            device_type: 0,
            vpp: 0,
            led: false,
            error: false,
            busy_remaining: 0,
            transfers: 0,
            writes: 0,
            status_polls: 0,
            trace: Vec::new(),
        }
    }

    /// Create a new dummy programmer with default configuration (27512)
    pub fn new_default() -> Self {
        Self::blank(DummyConfig::default())
    }

    /// Create a dummy programmer with pre-filled EPROM contents
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Result<Self> {
        let mut eprom = Self::new(config)?;
        let len = core::cmp::min(initial_data.len(), eprom.data.len());
        eprom.data[..len].copy_from_slice(&initial_data[..len]);
        Ok(eprom)
    }

    /// EPROM contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable EPROM contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Current value of the address register
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Whether the target side is powered
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Selected device type code
    pub fn device_type(&self) -> u8 {
        self.device_type
    }

    /// Selected VPP code
    pub fn vpp(&self) -> u8 {
        self.vpp
    }

    /// Whether the activity LED is on
    pub fn led(&self) -> bool {
        self.led
    }

    /// Number of WRITE and WRITE_INCA commands received
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of STATUS commands received
    pub fn status_polls(&self) -> usize {
        self.status_polls
    }

    /// Everything seen so far, in order
    pub fn trace(&self) -> &[Event] {
        &self.trace
    }

    /// Forget the recorded trace
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    fn offset(&self) -> usize {
        self.address as usize % self.data.len()
    }

    fn queue(&mut self) {
        self.busy_remaining = if self.config.stuck_busy {
            1
        } else {
            self.config.busy_polls
        };
    }

    fn status_byte(&self) -> u8 {
        let mut status = DeviceStatus::empty();
        if self.busy_remaining > 0 {
            status |= DeviceStatus::BUSY;
        }
        if self.error {
            status |= DeviceStatus::ERROR;
        }
        status.bits()
    }

    /// Program one byte at the current address
    fn program(&mut self, byte: u8) {
        self.writes += 1;
        let offset = self.offset();

        if self.config.fail_write_at == Some(self.writes) {
            log::debug!("dummy: injected write failure at 0x{:04X}", self.address);
            self.error = true;
            return;
        }

        // Programming pulses only clear bits
        let programmed = self.data[offset] & byte;
        self.data[offset] = programmed;
        self.error = programmed != byte;
        if self.error {
            log::debug!(
                "dummy: 0x{:02X} does not stick over 0x{:02X} at 0x{:04X}",
                byte,
                programmed,
                self.address
            );
        }
    }

    fn handle_eprom(&mut self, value: u16, index: u16) -> Result<Vec<u8>> {
        if !self.powered {
            return Err(Error::Transport(
                "SPI exchange while target is powered down".into(),
            ));
        }

        let (code, address, data) = EpromCommand::unpack(value, index);
        let Some(command) = EpromCommand::from_code(code) else {
            log::warn!("dummy: ignoring unknown EPROM command {}", code);
            return Ok(vec![0; 4]);
        };

        if command != EpromCommand::Status {
            self.trace.push(Event::Eprom {
                command,
                address,
                data,
            });
        }
        if command.is_mutating() {
            self.queue();
        }

        let rdata = self.data[self.offset()];
        match command {
            EpromCommand::Reset => {
                self.address = 0;
                self.error = false;
            }
            EpromCommand::Status => {}
            EpromCommand::Seek => self.address = address,
            EpromCommand::SetType => self.device_type = data,
            EpromCommand::SetVpp => self.vpp = data,
            EpromCommand::SetLed => self.led = data != 0,
            EpromCommand::Write => self.program(data),
            EpromCommand::Read => {}
            EpromCommand::WriteAutoincrement => {
                self.program(data);
                self.address = self.address.wrapping_add(1);
            }
            EpromCommand::ReadAutoincrement => self.address = self.address.wrapping_add(1),
        }

        let mut response = vec![0; 4];
        response[STATUS_BYTE] = self.status_byte();
        if command == EpromCommand::Status {
            self.status_polls += 1;
            if !self.config.stuck_busy {
                self.busy_remaining = self.busy_remaining.saturating_sub(1);
            }
        }
        response[DATA_BYTE] = rdata;
        Ok(response)
    }
}

impl ControlTransport for DummyEprom {
    fn control_in(&mut self, request: u8, value: u16, index: u16, length: u16) -> Result<Vec<u8>> {
        if let Some(limit) = self.config.disconnect_after {
            if self.transfers >= limit {
                return Err(Error::Transport("dummy: device disconnected".into()));
            }
        }
        self.transfers += 1;

        match Opcode::from_u8(request) {
            Some(Opcode::PowerUp) => {
                self.trace.push(Event::PowerUp {
                    sck: value,
                    reset: index,
                });
                self.powered = true;
                Ok(Vec::new())
            }
            Some(Opcode::PowerDown) => {
                self.trace.push(Event::PowerDown);
                self.powered = false;
                Ok(Vec::new())
            }
            Some(Opcode::SpiExchange) => self.handle_eprom(value, index),
            Some(Opcode::Echo) => {
                let [v0, v1] = value.to_le_bytes();
                let [i0, i1] = index.to_le_bytes();
                let [l0, l1] = length.to_le_bytes();
                Ok(vec![0xC0, request, v0, v1, i0, i1, l0, l1])
            }
            Some(op) => {
                log::debug!("dummy: {:?} not emulated", op);
                Ok(vec![0; length as usize])
            }
            None => Err(Error::Transport(format!("unknown request {}", request))),
        }
    }
}
