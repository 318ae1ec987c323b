//! Workflow passes over one device

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::device::{DeviceProfile, Vpp, MAX_DEVICE_SIZE};
use crate::error::{Error, Result};
use crate::hex::{DataChunk, HexDecoder};
use crate::programmer::ControlTransport;
use crate::protocol::EpromController;

use super::progress::{Phase, ProgressReporter, PROGRESS_INTERVAL};

/// Running address state of one pass
///
/// `current_address` mirrors the device's autoincrement pointer so the pass
/// can bounds-check and report progress without asking the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressCursor {
    /// Base set by the last extended address record (hex input only)
    pub base_address: u32,
    /// Address the next byte goes to
    pub current_address: u32,
}

/// Result of a successful write pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of bytes programmed
    pub bytes_written: usize,
    /// Programmed ranges, contiguous ranges merged, for a later verify pass
    pub chunks: Vec<DataChunk>,
}

impl WriteSummary {
    fn record(&mut self, chunk: DataChunk) {
        if let Some(last) = self.chunks.last_mut() {
            if last.end() == chunk.address as u64 {
                last.data.extend_from_slice(&chunk.data);
                return;
            }
        }
        self.chunks.push(chunk);
    }
}

/// One device, one controller, one pass at a time
///
/// Every public pass runs inside a session: whatever happens during the
/// pass, the shutdown sequence (power off, power on, type 0, LED off, power
/// off) runs exactly once before the pass returns.
pub struct ProgramWorkflow<'a, T> {
    controller: &'a mut EpromController<T>,
    profile: &'a DeviceProfile,
    vpp: Option<Vpp>,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a, T: ControlTransport> ProgramWorkflow<'a, T> {
    /// Create a workflow for `profile` on an open controller
    pub fn new(controller: &'a mut EpromController<T>, profile: &'a DeviceProfile) -> Self {
        Self {
            controller,
            profile,
            vpp: None,
            interrupt: None,
        }
    }

    /// Apply this programming voltage when initialising a write pass
    ///
    /// Read and verify passes leave the voltage selector alone.
    pub fn with_vpp(mut self, vpp: Vpp) -> Self {
        self.vpp = Some(vpp);
        self
    }

    /// Stop before the next byte once `flag` is set
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// The device this workflow drives
    pub fn profile(&self) -> &DeviceProfile {
        self.profile
    }

    /// Program a raw binary image starting at `start`
    ///
    /// At most `limit` bytes of `data` are written. The whole range is
    /// checked against the device size before anything is sent to the
    /// programmer.
    pub fn write_binary(
        &mut self,
        start: u32,
        data: &[u8],
        limit: Option<usize>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<WriteSummary> {
        let length = limit.map_or(data.len(), |l| l.min(data.len()));
        let data = &data[..length];

        self.session(|wf| {
            wf.check_capacity(start, length)?;
            wf.initialize(true)?;

            log::info!(
                "Writing {} bytes to {} at 0x{:05X}",
                length,
                wf.profile.name,
                start
            );
            progress.begin(Phase::Writing, Some(length));

            let mut summary = WriteSummary::default();
            let mut cursor = AddressCursor::default();
            if !data.is_empty() {
                wf.seek(&mut cursor, start)?;
                wf.program_bytes(&mut cursor, data, &mut summary.bytes_written, progress)?;
                summary.record(DataChunk {
                    address: start,
                    data: data.to_vec(),
                });
            }

            progress.end(Phase::Writing, summary.bytes_written);
            Ok(summary)
        })
    }

    /// Program the data records of an Intel HEX stream
    ///
    /// The stream is decoded up front and every record is checked against
    /// the device size before the programmer is touched, so a record that
    /// does not fit means nothing is written. A malformed line stops the
    /// decode; the records before it are still programmed and the format
    /// error is returned afterwards.
    pub fn write_hex<L, S>(
        &mut self,
        mut decoder: HexDecoder<L>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<WriteSummary>
    where
        L: Iterator<Item = io::Result<S>>,
        S: AsRef<[u8]>,
    {
        let mut records = Vec::new();
        let mut format_error = None;
        while let Some(chunk) = decoder.next_chunk() {
            match chunk {
                Ok(chunk) => records.push((decoder.base_address(), chunk)),
                Err(e) => {
                    format_error = Some(e);
                    break;
                }
            }
        }
        let total: usize = records.iter().map(|(_, c)| c.data.len()).sum();

        self.session(|wf| {
            for (_, chunk) in &records {
                wf.check_capacity(chunk.address, chunk.data.len())?;
            }
            wf.initialize(true)?;

            log::info!(
                "Writing {} hex records ({} bytes) to {}",
                records.len(),
                total,
                wf.profile.name
            );
            progress.begin(Phase::Writing, Some(total));

            let mut summary = WriteSummary::default();
            let mut cursor = AddressCursor::default();
            let mut positioned = false;

            for (base_address, chunk) in records {
                cursor.base_address = base_address;
                // Records that continue where the last one ended need no seek
                if !positioned || cursor.current_address != chunk.address {
                    wf.seek(&mut cursor, chunk.address)?;
                    positioned = true;
                }
                wf.program_bytes(&mut cursor, &chunk.data, &mut summary.bytes_written, progress)?;
                summary.record(chunk);
            }

            progress.end(Phase::Writing, summary.bytes_written);
            match format_error {
                Some(e) => Err(e),
                None => Ok(summary),
            }
        })
    }

    /// Read `count` bytes starting at `start`
    ///
    /// `count` defaults to the rest of the device.
    pub fn read(
        &mut self,
        start: u32,
        count: Option<usize>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Vec<u8>> {
        let count = count.unwrap_or_else(|| self.profile.size.saturating_sub(start as usize));

        self.session(|wf| {
            wf.check_capacity(start, count)?;
            wf.initialize(false)?;

            log::info!(
                "Reading {} bytes from {} at 0x{:05X}",
                count,
                wf.profile.name,
                start
            );
            progress.begin(Phase::Reading, Some(count));

            let mut data = Vec::with_capacity(count);
            let mut cursor = AddressCursor::default();
            if count > 0 {
                wf.seek(&mut cursor, start)?;
            }
            while data.len() < count {
                wf.check_interrupt()?;
                data.push(wf.controller.read_autoincrement()?);
                cursor.current_address += 1;
                if data.len() % PROGRESS_INTERVAL == 0 {
                    progress.advance(cursor.current_address, data.len());
                }
            }

            progress.end(Phase::Reading, data.len());
            Ok(data)
        })
    }

    /// Read back `chunks` and compare with their contents
    pub fn verify(
        &mut self,
        chunks: &[DataChunk],
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        let total: usize = chunks.iter().map(|c| c.data.len()).sum();

        self.session(|wf| {
            for chunk in chunks {
                wf.check_capacity(chunk.address, chunk.data.len())?;
            }
            wf.initialize(false)?;

            log::info!("Verifying {} bytes on {}", total, wf.profile.name);
            progress.begin(Phase::Verifying, Some(total));

            let mut done = 0usize;
            let mut cursor = AddressCursor::default();
            for chunk in chunks.iter().filter(|c| !c.data.is_empty()) {
                wf.seek(&mut cursor, chunk.address)?;
                for &expected in &chunk.data {
                    wf.check_interrupt()?;
                    let address = cursor.current_address;
                    let found = wf.controller.read_autoincrement()?;
                    if found != expected {
                        return Err(Error::Verify {
                            address,
                            expected,
                            found,
                        });
                    }
                    cursor.current_address += 1;
                    done += 1;
                    if done % PROGRESS_INTERVAL == 0 {
                        progress.advance(cursor.current_address, done);
                    }
                }
            }

            progress.end(Phase::Verifying, done);
            Ok(())
        })
    }

    /// Leave the socket unpowered and deselected
    ///
    /// Every step is attempted even when an earlier one fails; the first
    /// failure is returned.
    pub fn shutdown(&mut self) -> Result<()> {
        let steps: [(&str, fn(&mut EpromController<T>) -> Result<()>); 5] = [
            ("power off", |c| c.power_off()),
            ("power on", |c| c.power_on()),
            ("deselect device", |c| c.set_type(0)),
            ("LED off", |c| c.set_led(false)),
            ("power off", |c| c.power_off()),
        ];

        log::debug!("Shutting down programmer");
        let mut first_error = None;
        for (name, step) in steps {
            if let Err(e) = step(&mut *self.controller) {
                log::warn!("Shutdown step '{}' failed: {}", name, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Run one pass, then the shutdown sequence, whatever the outcome
    fn session<R>(&mut self, pass: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let result = pass(self);
        if let Err(e) = &result {
            log::debug!("Pass failed: {}", e);
        }
        let shutdown = self.shutdown();

        match (result, shutdown) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(shutdown_err)) => {
                log::warn!("Shutdown after failed pass also failed: {}", shutdown_err);
                Err(e)
            }
        }
    }

    /// Power-cycle and select the device
    ///
    /// The programming voltage is only set when `program` is true.
    fn initialize(&mut self, program: bool) -> Result<()> {
        log::debug!(
            "Initializing programmer for {} (type {})",
            self.profile.name,
            self.profile.type_code
        );
        self.controller.power_off()?;
        self.controller.power_on()?;
        self.controller.reset()?;
        self.controller.set_led(true)?;
        self.controller.set_type(self.profile.type_code)?;
        if let Some(vpp) = self.vpp.filter(|_| program) {
            self.controller.set_vpp(vpp)?;
        }
        Ok(())
    }

    fn check_capacity(&self, address: u32, length: usize) -> Result<()> {
        if self.profile.size > MAX_DEVICE_SIZE {
            return Err(Error::InvalidArgument(format!(
                "{} is {} bytes, beyond the 16-bit address register",
                self.profile.name, self.profile.size
            )));
        }
        if self.profile.contains(address, length) {
            Ok(())
        } else {
            Err(Error::Capacity {
                address,
                length,
                size: self.profile.size,
            })
        }
    }

    fn check_interrupt(&self) -> Result<()> {
        match self.interrupt {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Interrupted),
            _ => Ok(()),
        }
    }

    fn seek(&mut self, cursor: &mut AddressCursor, address: u32) -> Result<()> {
        let register = u16::try_from(address).map_err(|_| {
            Error::InvalidArgument(format!(
                "address 0x{:X} beyond the 16-bit address register",
                address
            ))
        })?;
        self.controller.seek(register)?;
        cursor.current_address = address;
        Ok(())
    }

    /// Write `data` at the cursor, checking the error flag after every byte
    fn program_bytes(
        &mut self,
        cursor: &mut AddressCursor,
        data: &[u8],
        written: &mut usize,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        for &byte in data {
            self.check_interrupt()?;
            let address = cursor.current_address;
            self.controller.write_autoincrement(byte)?;
            if self.controller.is_error()? {
                log::error!("Programming failed at 0x{:05X}", address);
                return Err(Error::Programming { address });
            }
            cursor.current_address += 1;
            *written += 1;
            if *written % PROGRESS_INTERVAL == 0 {
                progress.advance(cursor.current_address, *written);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::NoProgress;
    use crate::protocol::{EpromCommand, Opcode};
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        PowerUp,
        PowerDown,
        Command(EpromCommand, u8),
    }

    /// Minimal firmware stand-in that records the command stream
    struct Fake {
        memory: Vec<u8>,
        pointer: usize,
        error: bool,
        fail_on_write: Option<usize>,
        writes: usize,
        events: Vec<Event>,
        on_write: Option<Box<dyn FnMut(usize)>>,
    }

    impl Fake {
        fn new(size: usize) -> Self {
            Self {
                memory: vec![0xFF; size],
                pointer: 0,
                error: false,
                fail_on_write: None,
                writes: 0,
                events: Vec::new(),
                on_write: None,
            }
        }

        fn count(&self, cmd: EpromCommand) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, Event::Command(c, _) if *c == cmd))
                .count()
        }

        fn shutdowns(&self) -> usize {
            self.events.windows(5).filter(|w| *w == SHUTDOWN).count()
        }
    }

    const SHUTDOWN: [Event; 5] = [
        Event::PowerDown,
        Event::PowerUp,
        Event::Command(EpromCommand::SetType, 0),
        Event::Command(EpromCommand::SetLed, 0),
        Event::PowerDown,
    ];

    impl ControlTransport for Fake {
        fn control_in(
            &mut self,
            request: u8,
            value: u16,
            index: u16,
            _length: u16,
        ) -> Result<Vec<u8>> {
            match Opcode::from_u8(request) {
                Some(Opcode::SpiExchange) => {}
                Some(Opcode::PowerUp) => {
                    self.events.push(Event::PowerUp);
                    return Ok(Vec::new());
                }
                Some(Opcode::PowerDown) => {
                    self.events.push(Event::PowerDown);
                    return Ok(Vec::new());
                }
                _ => return Ok(Vec::new()),
            }

            let (code, address, data) = EpromCommand::unpack(value, index);
            let cmd = EpromCommand::from_code(code).unwrap();
            if cmd != EpromCommand::Status {
                self.events.push(Event::Command(cmd, data));
            }
            let mut rdata = 0;
            match cmd {
                EpromCommand::Reset => {
                    self.pointer = 0;
                    self.error = false;
                }
                EpromCommand::Seek => self.pointer = address as usize,
                EpromCommand::WriteAutoincrement => {
                    self.writes += 1;
                    if let Some(hook) = &mut self.on_write {
                        hook(self.writes);
                    }
                    if self.fail_on_write == Some(self.writes) {
                        self.error = true;
                    } else {
                        self.error = false;
                        self.memory[self.pointer] = data;
                    }
                    self.pointer += 1;
                }
                EpromCommand::ReadAutoincrement => {
                    rdata = self.memory[self.pointer];
                    self.pointer += 1;
                }
                _ => {}
            }
            let status = if self.error { 0x02 } else { 0x00 };
            Ok(vec![0, 0, status, rdata])
        }
    }

    fn profile() -> DeviceProfile {
        DeviceProfile::new("27256", 32 * 1024, 3)
    }

    #[test]
    fn test_write_then_read_back() {
        let profile = profile();
        let mut ctl = EpromController::new(Fake::new(profile.size));
        let data: Vec<u8> = (0..=255u8).collect();

        let mut wf = ProgramWorkflow::new(&mut ctl, &profile).with_vpp(Vpp::V12);
        let summary = wf.write_binary(0, &data, None, &mut NoProgress).unwrap();
        assert_eq!(summary.bytes_written, 256);
        let back = wf.read(0, Some(256), &mut NoProgress).unwrap();
        assert_eq!(back, data);

        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::Seek), 2);
        // Only the write pass selects the voltage
        assert_eq!(fake.count(EpromCommand::SetVpp), 1);
        assert_eq!(fake.shutdowns(), 2);
    }

    #[test]
    fn test_initialize_sequence() {
        let profile = profile();
        let mut ctl = EpromController::new(Fake::new(profile.size));
        ProgramWorkflow::new(&mut ctl, &profile)
            .with_vpp(Vpp::V21)
            .write_binary(0x10, &[0xAA], None, &mut NoProgress)
            .unwrap();

        let events = &ctl.protocol().transport().events;
        assert_eq!(
            events[..7],
            [
                Event::PowerDown,
                Event::PowerUp,
                Event::Command(EpromCommand::Reset, 0),
                Event::Command(EpromCommand::SetLed, 1),
                Event::Command(EpromCommand::SetType, 3),
                Event::Command(EpromCommand::SetVpp, 2),
                Event::Command(EpromCommand::Seek, 0),
            ]
        );
        assert_eq!(events[events.len() - 5..], SHUTDOWN);
    }

    #[test]
    fn test_capacity_checked_before_writes() {
        let profile = DeviceProfile::new("2764", 8192, 1);
        let mut ctl = EpromController::new(Fake::new(profile.size));
        let data = vec![0u8; 16];

        let err = ProgramWorkflow::new(&mut ctl, &profile)
            .write_binary(8190, &data, None, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Capacity {
                address: 8190,
                length: 16,
                size: 8192
            }
        ));

        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::WriteAutoincrement), 0);
        assert_eq!(fake.count(EpromCommand::Write), 0);
        assert_eq!(fake.events[..], SHUTDOWN);
    }

    #[test]
    fn test_limit_truncates_data() {
        let profile = DeviceProfile::new("2764", 8192, 1);
        let mut ctl = EpromController::new(Fake::new(profile.size));
        let data = vec![0x55u8; 64];

        // 64 bytes would not fit at 8160, the first 32 do
        let summary = ProgramWorkflow::new(&mut ctl, &profile)
            .write_binary(8160, &data, Some(32), &mut NoProgress)
            .unwrap();
        assert_eq!(summary.bytes_written, 32);
        assert_eq!(ctl.protocol().transport().memory[8160..], [0x55; 32]);
    }

    #[test]
    fn test_programming_error_stops_pass() {
        let profile = profile();
        let mut fake = Fake::new(profile.size);
        fake.fail_on_write = Some(5);
        let mut ctl = EpromController::new(fake);

        let err = ProgramWorkflow::new(&mut ctl, &profile)
            .write_binary(0x200, &[1, 2, 3, 4, 5, 6, 7, 8], None, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::Programming { address: 0x204 }));

        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::WriteAutoincrement), 5);
        assert_eq!(fake.shutdowns(), 1);
        assert_eq!(fake.events[fake.events.len() - 5..], SHUTDOWN);
    }

    #[test]
    fn test_interrupt_runs_shutdown() {
        let profile = profile();
        let flag = Arc::new(AtomicBool::new(false));
        let mut fake = Fake::new(profile.size);
        let raised = Arc::clone(&flag);
        // Raise the interrupt while the third byte is being programmed
        fake.on_write = Some(Box::new(move |n| {
            if n == 3 {
                raised.store(true, Ordering::Relaxed);
            }
        }));
        let mut ctl = EpromController::new(fake);

        let err = ProgramWorkflow::new(&mut ctl, &profile)
            .with_interrupt(&flag)
            .write_binary(0, &[0u8; 10], None, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::Interrupted));

        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::WriteAutoincrement), 3);
        assert_eq!(fake.shutdowns(), 1);
    }

    #[test]
    fn test_hex_format_error_keeps_earlier_records() {
        let profile = profile();
        let mut ctl = EpromController::new(Fake::new(profile.size));
        let text = ":0300300002337A1E\n:0300400002337A1E\n";

        let err = ProgramWorkflow::new(&mut ctl, &profile)
            .write_hex(HexDecoder::from_reader(text.as_bytes()), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::Format { line: 2, .. }));

        let fake = ctl.protocol().transport();
        assert_eq!(fake.memory[0x30..0x33], [0x02, 0x33, 0x7A]);
        assert_eq!(fake.shutdowns(), 1);
    }

    #[test]
    fn test_hex_seeks_only_on_gaps() {
        let profile = profile();
        let mut ctl = EpromController::new(Fake::new(profile.size));
        // 0x0000..0x0002, 0x0002..0x0004 (contiguous), then 0x0100
        let text = ":020000000102FB\n:020002000304F5\n:01010000AA54\n:00000001FF\n";

        let summary = ProgramWorkflow::new(&mut ctl, &profile)
            .write_hex(HexDecoder::from_reader(text.as_bytes()), &mut NoProgress)
            .unwrap();
        assert_eq!(summary.bytes_written, 5);
        assert_eq!(
            summary.chunks,
            vec![
                DataChunk {
                    address: 0,
                    data: vec![1, 2, 3, 4]
                },
                DataChunk {
                    address: 0x100,
                    data: vec![0xAA]
                },
            ]
        );

        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::Seek), 2);
        assert_eq!(fake.memory[..4], [1, 2, 3, 4]);
        assert_eq!(fake.memory[0x100], 0xAA);
    }

    #[test]
    fn test_hex_record_beyond_device() {
        let profile = DeviceProfile::new("2764", 8192, 1);
        let mut ctl = EpromController::new(Fake::new(profile.size));
        // The first record fits; extended linear address 0x0001 puts the
        // second at 0x10000
        let text = ":0300300002337A1E\n:020000040001F9\n:01000000AA55\n";

        let err = ProgramWorkflow::new(&mut ctl, &profile)
            .write_hex(HexDecoder::from_reader(text.as_bytes()), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::Capacity { address: 0x10000, .. }));

        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::WriteAutoincrement), 0);
        assert_eq!(fake.memory[0x30], 0xFF);
        assert_eq!(fake.events[..], SHUTDOWN);
    }

    #[test]
    fn test_profile_beyond_address_register() {
        let profile = DeviceProfile::new("271001", 0x2_0000, 5);
        let mut ctl = EpromController::new(Fake::new(profile.size));

        let err = ProgramWorkflow::new(&mut ctl, &profile)
            .write_binary(0x1_0000, &[0x00], None, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::WriteAutoincrement), 0);
        assert_eq!(fake.memory[0], 0xFF);
        assert_eq!(fake.events[..], SHUTDOWN);
    }

    #[test]
    fn test_verify_leaves_vpp_alone() {
        let profile = profile();
        let mut ctl = EpromController::new(Fake::new(profile.size));

        let mut wf = ProgramWorkflow::new(&mut ctl, &profile).with_vpp(Vpp::V21);
        let summary = wf.write_binary(0x80, &[0x12, 0x34], None, &mut NoProgress).unwrap();
        ctl.protocol_mut().transport_mut().events.clear();

        ProgramWorkflow::new(&mut ctl, &profile)
            .with_vpp(Vpp::V21)
            .verify(&summary.chunks, &mut NoProgress)
            .unwrap();
        let fake = ctl.protocol().transport();
        assert_eq!(fake.count(EpromCommand::SetVpp), 0);
        assert_eq!(fake.count(EpromCommand::ReadAutoincrement), 2);
        assert_eq!(fake.shutdowns(), 1);
    }

    #[test]
    fn test_verify_detects_mismatch() {
        let profile = profile();
        let mut fake = Fake::new(profile.size);
        fake.memory[0x42] = 0x00;
        let mut ctl = EpromController::new(fake);

        let chunks = [DataChunk {
            address: 0x40,
            data: vec![0xFF; 8],
        }];
        let err = ProgramWorkflow::new(&mut ctl, &profile)
            .verify(&chunks, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Verify {
                address: 0x42,
                expected: 0xFF,
                found: 0x00
            }
        ));
    }

    #[test]
    fn test_read_defaults_to_rest_of_device() {
        let profile = DeviceProfile::new("2764", 8192, 1);
        let mut ctl = EpromController::new(Fake::new(profile.size));
        let data = ProgramWorkflow::new(&mut ctl, &profile)
            .read(8192 - 100, None, &mut NoProgress)
            .unwrap();
        assert_eq!(data.len(), 100);
    }

    #[test]
    fn test_progress_cadence() {
        struct Recorder(Vec<(u32, usize)>);
        impl ProgressReporter for Recorder {
            fn begin(&mut self, _phase: Phase, _total_bytes: Option<usize>) {}
            fn advance(&mut self, address: u32, bytes_done: usize) {
                self.0.push((address, bytes_done));
            }
            fn end(&mut self, _phase: Phase, _bytes_done: usize) {}
        }

        let profile = profile();
        let mut ctl = EpromController::new(Fake::new(profile.size));
        let mut progress = Recorder(Vec::new());
        ProgramWorkflow::new(&mut ctl, &profile)
            .write_binary(0x100, &[0u8; 40], None, &mut progress)
            .unwrap();
        assert_eq!(progress.0, vec![(0x110, 16), (0x120, 32)]);
    }
}
