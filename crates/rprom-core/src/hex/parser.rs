//! Intel HEX line parser and streaming decoder

use std::io::{self, BufRead};
use std::iter::FusedIterator;
use std::vec;

use crate::error::{Error, Result};

use super::types::*;

/// Two's complement checksum of a record body
///
/// `body` is everything from the byte count through the last payload byte.
pub fn checksum(body: &[u8]) -> u8 {
    let sum = body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (!sum).wrapping_add(1)
}

/// Decode a string of hex digit pairs
fn decode_hex(digits: &str) -> core::result::Result<Vec<u8>, FormatError> {
    let raw = digits.as_bytes();
    if raw.len() % 2 != 0 || !raw.iter().all(u8::is_ascii_hexdigit) {
        return Err(FormatError::InvalidHex);
    }

    raw.chunks_exact(2)
        .map(|pair| {
            // Both bytes are ASCII hex digits, so this is valid UTF-8
            let s = core::str::from_utf8(pair).map_err(|_| FormatError::InvalidHex)?;
            u8::from_str_radix(s, 16).map_err(|_| FormatError::InvalidHex)
        })
        .collect()
}

/// Parse and verify a single Intel HEX line
///
/// Trailing whitespace (including `\r`) is ignored.
pub fn parse_line(line: &str) -> core::result::Result<HexRecord, FormatError> {
    let digits = line
        .trim_end()
        .strip_prefix(START_CODE)
        .ok_or(FormatError::MissingStartCode)?;
    let bytes = decode_hex(digits)?;

    // count + offset(2) + type + checksum
    if bytes.len() < 5 {
        return Err(FormatError::TooShort(bytes.len()));
    }

    let byte_count = bytes[0];
    let actual = bytes.len() - 5;
    if actual != byte_count as usize {
        return Err(FormatError::LengthMismatch {
            declared: byte_count,
            actual,
        });
    }

    let (body, tail) = bytes.split_at(bytes.len() - 1);
    let computed = checksum(body);
    if computed != tail[0] {
        return Err(FormatError::ChecksumMismatch {
            expected: tail[0],
            computed,
        });
    }

    let record_type =
        RecordType::from_u8(bytes[3]).ok_or(FormatError::UnknownRecordType(bytes[3]))?;

    Ok(HexRecord {
        byte_count,
        offset: u16::from_be_bytes([bytes[1], bytes[2]]),
        record_type,
        data: body[4..].to_vec(),
        checksum: tail[0],
    })
}

/// Streaming Intel HEX decoder
///
/// Consumes a source of raw lines once. A line that is not valid UTF-8 is
/// reported as a format error on that line. As an [`Iterator`] it yields
/// `(absolute address, byte)` pairs in file order; [`next_chunk`] yields
/// whole data records instead. Decoding stops for good at the end-of-file
/// record or at the first error.
///
/// [`next_chunk`]: HexDecoder::next_chunk
pub struct HexDecoder<L> {
    lines: L,
    line: usize,
    base_address: u32,
    pending: Option<(u32, vec::IntoIter<u8>)>,
    done: bool,
}

impl<R: BufRead> HexDecoder<io::Split<R>> {
    /// Decode `\n`-separated lines read from `reader`
    pub fn from_reader(reader: R) -> Self {
        Self::new(reader.split(b'\n'))
    }
}

impl<L, S> HexDecoder<L>
where
    L: Iterator<Item = io::Result<S>>,
    S: AsRef<[u8]>,
{
    /// Decode the given line source
    pub fn new(lines: L) -> Self {
        Self {
            lines,
            line: 0,
            base_address: 0,
            pending: None,
            done: false,
        }
    }

    /// Number of lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current extended base address
    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    /// Next data record, resolved to its absolute address
    ///
    /// Bytes of a record partially consumed through the byte iterator are
    /// returned first as their own chunk.
    pub fn next_chunk(&mut self) -> Option<Result<DataChunk>> {
        if let Some((address, rest)) = self.pending.take() {
            let data: Vec<u8> = rest.collect();
            if !data.is_empty() {
                return Some(Ok(DataChunk { address, data }));
            }
        }

        while !self.done {
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::Io(e)));
                }
                Some(Ok(line)) => line,
            };
            self.line += 1;

            let Ok(text) = core::str::from_utf8(line.as_ref()) else {
                self.done = true;
                return Some(Err(Error::Format {
                    line: self.line,
                    kind: FormatError::InvalidHex,
                }));
            };
            if text.trim().is_empty() {
                continue;
            }

            match self.process_line(text) {
                Ok(Some(chunk)) => return Some(Ok(chunk)),
                Ok(None) => {}
                Err(kind) => {
                    self.done = true;
                    return Some(Err(Error::Format {
                        line: self.line,
                        kind,
                    }));
                }
            }
        }

        None
    }

    /// Apply one line to the decoder state
    fn process_line(&mut self, text: &str) -> core::result::Result<Option<DataChunk>, FormatError> {
        let record = parse_line(text)?;

        match record.record_type {
            RecordType::Data => {
                if record.data.is_empty() {
                    return Ok(None);
                }
                let address = self
                    .base_address
                    .checked_add(record.offset as u32)
                    .ok_or(FormatError::AddressOverflow)?;
                let chunk = DataChunk {
                    address,
                    data: record.data,
                };
                if chunk.end() > u32::MAX as u64 + 1 {
                    return Err(FormatError::AddressOverflow);
                }
                return Ok(Some(chunk));
            }
            RecordType::EndOfFile => {
                log::debug!("hex end-of-file record at line {}", self.line);
                self.done = true;
            }
            RecordType::ExtendedSegmentAddress => {
                self.base_address = record.address_value()? as u32 * 16;
                log::debug!("hex segment base 0x{:08X}", self.base_address);
            }
            RecordType::ExtendedLinearAddress => {
                self.base_address = (record.address_value()? as u32) << 16;
                log::debug!("hex linear base 0x{:08X}", self.base_address);
            }
            // Start addresses mean nothing to an EPROM
            RecordType::StartSegmentAddress | RecordType::StartLinearAddress => {}
        }

        Ok(None)
    }
}

impl<L, S> Iterator for HexDecoder<L>
where
    L: Iterator<Item = io::Result<S>>,
    S: AsRef<[u8]>,
{
    type Item = Result<(u32, u8)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((address, rest)) = &mut self.pending {
                if let Some(byte) = rest.next() {
                    let current = *address;
                    *address = address.wrapping_add(1);
                    return Some(Ok((current, byte)));
                }
                self.pending = None;
            }

            match self.next_chunk()? {
                Ok(chunk) => self.pending = Some((chunk.address, chunk.data.into_iter())),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<L, S> FusedIterator for HexDecoder<L>
where
    L: Iterator<Item = io::Result<S>>,
    S: AsRef<[u8]>,
{
}
