//! Image file loading

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use rprom_core::hex::{DataChunk, HexDecoder};

use crate::cli::ImageFormat;

/// Line-by-line hex decoder over a file
pub type FileDecoder = HexDecoder<io::Split<BufReader<File>>>;

/// Open `path` for streaming hex decoding
pub fn open_hex(path: &Path) -> Result<FileDecoder, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    Ok(HexDecoder::from_reader(BufReader::new(file)))
}

/// Read a binary image, keeping at most `count` bytes
pub fn read_binary(path: &Path, count: Option<usize>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    if let Some(count) = count {
        data.truncate(count);
    }
    Ok(data)
}

/// Load an image as the ranges it describes
///
/// Hex records are merged where they are contiguous. A binary image is one
/// range starting at `address`.
pub fn load_chunks(
    path: &Path,
    format: ImageFormat,
    address: u32,
    count: Option<usize>,
) -> Result<Vec<DataChunk>, Box<dyn std::error::Error>> {
    match format {
        ImageFormat::Bin => Ok(vec![DataChunk {
            address,
            data: read_binary(path, count)?,
        }]),
        ImageFormat::Hex => {
            let mut decoder = open_hex(path)?;
            let mut chunks: Vec<DataChunk> = Vec::new();
            while let Some(chunk) = decoder.next_chunk() {
                let chunk = chunk?;
                if let Some(last) = chunks.last_mut() {
                    if last.end() == chunk.address as u64 {
                        last.data.extend_from_slice(&chunk.data);
                        continue;
                    }
                }
                chunks.push(chunk);
            }
            Ok(chunks)
        }
    }
}
