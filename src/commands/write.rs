//! Write command implementation

use std::path::Path;

use rprom_core::device::Vpp;

use super::image;
use super::progress::IndicatifProgress;
use super::Session;
use crate::cli::ImageFormat;

/// Run the write command
///
/// With `verify`, the programmed ranges are read back in a second pass.
pub fn run_write(
    session: &mut Session,
    input: &Path,
    format: ImageFormat,
    vpp: Vpp,
    address: u32,
    count: Option<usize>,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut progress = IndicatifProgress::new();
    log::info!("Programming voltage {}", vpp);
    let mut workflow = session.workflow().with_vpp(vpp);

    let summary = match format {
        ImageFormat::Hex => workflow.write_hex(image::open_hex(input)?, &mut progress)?,
        ImageFormat::Bin => {
            let data = image::read_binary(input, None)?;
            workflow.write_binary(address, &data, count, &mut progress)?
        }
    };
    println!(
        "Wrote {} bytes to {} in {} range(s)",
        summary.bytes_written,
        workflow.profile().name,
        summary.chunks.len()
    );

    if verify {
        workflow.verify(&summary.chunks, &mut progress)?;
        println!("Verification passed");
    }

    Ok(())
}
