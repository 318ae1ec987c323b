//! Verify command implementation

use std::path::Path;

use super::image;
use super::progress::IndicatifProgress;
use super::Session;
use crate::cli::ImageFormat;

/// Run the verify command
pub fn run_verify(
    session: &mut Session,
    input: &Path,
    format: ImageFormat,
    address: u32,
    count: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let chunks = image::load_chunks(input, format, address, count)?;
    let total: usize = chunks.iter().map(|c| c.data.len()).sum();

    let mut progress = IndicatifProgress::new();
    session.workflow().verify(&chunks, &mut progress)?;

    println!("Verified {} bytes on {}", total, session.profile().name);
    Ok(())
}
