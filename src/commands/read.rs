//! Read command implementation

use std::fs;
use std::path::Path;

use super::progress::IndicatifProgress;
use super::Session;

/// Run the read command
pub fn run_read(
    session: &mut Session,
    output: &Path,
    address: u32,
    count: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut progress = IndicatifProgress::new();
    let data = session.workflow().read(address, count, &mut progress)?;

    fs::write(output, &data)?;
    println!(
        "Read {} bytes from {} at 0x{:05X} into {:?}",
        data.len(),
        session.profile().name,
        address,
        output
    );

    Ok(())
}
