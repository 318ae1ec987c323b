//! Intel HEX decoding
//!
//! Intel HEX files are ASCII lines of the form `:BBAAAATT<data>CC`: byte
//! count, 16-bit offset, record type, payload and checksum, all in hex.
//! Extended address records move a running base address that is added to
//! the offset of every following data record.
//!
//! # Usage
//!
//! ```
//! use rprom_core::hex::HexDecoder;
//!
//! let text = ":0300300002337A1E\n:00000001FF\n";
//! let bytes: Vec<(u32, u8)> = HexDecoder::from_reader(text.as_bytes())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(bytes, vec![(0x30, 0x02), (0x31, 0x33), (0x32, 0x7A)]);
//! ```

mod parser;
mod types;

pub use parser::*;
pub use types::*;
