//! Intel HEX record types

use thiserror::Error;

/// Record start marker
pub const START_CODE: char = ':';

/// Intel HEX record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Payload bytes at `base + offset`
    Data,
    /// End of file; nothing after it is read
    EndOfFile,
    /// Base address = payload * 16
    ExtendedSegmentAddress,
    /// CS:IP start address, ignored
    StartSegmentAddress,
    /// Base address = payload << 16
    ExtendedLinearAddress,
    /// EIP start address, ignored
    StartLinearAddress,
}

impl RecordType {
    /// Decode a record type byte
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Data,
            1 => Self::EndOfFile,
            2 => Self::ExtendedSegmentAddress,
            3 => Self::StartSegmentAddress,
            4 => Self::ExtendedLinearAddress,
            5 => Self::StartLinearAddress,
            _ => return None,
        })
    }

    /// Record type byte
    pub fn code(self) -> u8 {
        match self {
            Self::Data => 0,
            Self::EndOfFile => 1,
            Self::ExtendedSegmentAddress => 2,
            Self::StartSegmentAddress => 3,
            Self::ExtendedLinearAddress => 4,
            Self::StartLinearAddress => 5,
        }
    }
}

/// One parsed and checksum-verified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexRecord {
    /// Declared payload length
    pub byte_count: u8,
    /// 16-bit load offset
    pub offset: u16,
    /// Record type
    pub record_type: RecordType,
    /// Payload bytes
    pub data: Vec<u8>,
    /// Trailing checksum byte
    pub checksum: u8,
}

impl HexRecord {
    /// Payload of a type 2/4 record as a big-endian 16-bit value
    pub fn address_value(&self) -> Result<u16, FormatError> {
        match self.data.as_slice() {
            [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
            _ => Err(FormatError::BadAddressRecord {
                record_type: self.record_type.code(),
                len: self.data.len(),
            }),
        }
    }
}

/// A data record resolved to an absolute address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChunk {
    /// Absolute address of the first byte
    pub address: u32,
    /// Payload bytes
    pub data: Vec<u8>,
}

impl DataChunk {
    /// Address one past the last byte
    pub fn end(&self) -> u64 {
        self.address as u64 + self.data.len() as u64
    }
}

/// Ways a hex line can be malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Line does not begin with ':'
    #[error("line does not begin with ':'")]
    MissingStartCode,
    /// Non-hex characters or an odd number of digits
    #[error("invalid hex digits")]
    InvalidHex,
    /// Not even room for count, offset, type and checksum
    #[error("record too short ({0} bytes)")]
    TooShort(usize),
    /// Decoded length disagrees with the byte count field
    #[error("byte count {declared} does not match {actual} payload bytes")]
    LengthMismatch {
        /// Byte count field
        declared: u8,
        /// Payload bytes actually present
        actual: usize,
    },
    /// Checksum byte does not match the record contents
    #[error("invalid checksum {expected:02X}!={computed:02X}")]
    ChecksumMismatch {
        /// Checksum byte in the record
        expected: u8,
        /// Checksum computed over the record
        computed: u8,
    },
    /// Type 2/4 record without exactly two payload bytes
    #[error("address record type {record_type} has {len} payload bytes, expected 2")]
    BadAddressRecord {
        /// Record type
        record_type: u8,
        /// Payload length
        len: usize,
    },
    /// Record type outside 0..=5
    #[error("unknown record type {0:02X}")]
    UnknownRecordType(u8),
    /// Absolute address does not fit 32 bits
    #[error("address overflow")]
    AddressOverflow,
}
