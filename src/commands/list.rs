//! List commands implementation

use rprom_core::device::{DeviceDatabase, Vpp};

use crate::programmers;

/// List all supported programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();
    for p in programmers::available_programmers() {
        let aliases = if p.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", p.aliases.join(", "))
        };
        println!("  {:<10} - {}{}", p.name, p.description, aliases);
    }

    #[cfg(feature = "usbtiny")]
    match rprom_usbtiny::UsbTiny::list_devices() {
        Ok(devices) if !devices.is_empty() => {
            println!();
            println!("Connected:");
            for d in devices {
                println!("  {}", d);
            }
        }
        Ok(_) => {}
        Err(e) => log::debug!("USB enumeration failed: {}", e),
    }
}

/// List all devices in the database
pub fn list_devices(db: &DeviceDatabase) {
    println!("Supported EPROM devices:");
    println!();
    println!("{:<12} {:>10} {:>6}", "Name", "Size", "Type");
    println!("{}", "-".repeat(30));

    for device in db.iter() {
        println!(
            "{:<12} {:>10} {:>6}",
            device.name,
            format_size(device.size),
            device.type_code
        );
    }

    let voltages: Vec<&str> = Vpp::ALL.iter().map(|v| v.name()).collect();
    println!();
    println!("Programming voltages: {}", voltages.join(", "));
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
