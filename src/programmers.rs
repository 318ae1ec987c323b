//! Programmer registration and dispatch
//!
//! This module provides a centralized registry for all programmers, with support
//! for feature-gated inclusion and dynamic help text generation.

use rprom_core::device::DeviceProfile;
use rprom_core::programmer::ControlTransport;

/// Boxed transport as handed to the EPROM controller
pub type BoxedTransport = Box<dyn ControlTransport + Send>;

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "usbtiny")]
    programmers.push(ProgrammerInfo {
        name: "usbtiny",
        aliases: &["usbtiny_eprom"],
        description: "USBtiny EPROM programmer (VID:1781 PID:0c9f)",
    });

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory EPROM emulator for testing",
    });

    programmers
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Resolve a programmer name or alias to its primary name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.contains(&name))
        .map(|p| p.name)
}

/// Open the named programmer
///
/// The dummy programmer is sized to `profile` so capacity behaves as it
/// would with a real part in the socket.
#[allow(unused_variables)]
pub fn open_programmer(
    name: &str,
    profile: &DeviceProfile,
) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    let canonical_name = find_programmer(name).ok_or_else(|| unknown_programmer_error(name))?;

    match canonical_name {
        #[cfg(feature = "usbtiny")]
        "usbtiny" => {
            log::info!("Opening USBtiny programmer...");
            let usbtiny = rprom_usbtiny::UsbTiny::open().map_err(|e| {
                format!(
                    "Failed to open USBtiny: {}\nMake sure the device is connected and you have permissions.",
                    e
                )
            })?;
            Ok(Box::new(usbtiny))
        }

        #[cfg(feature = "dummy")]
        "dummy" => {
            let config = rprom_dummy::DummyConfig {
                size: profile.size,
                ..Default::default()
            };
            Ok(Box::new(rprom_dummy::DummyEprom::new(config)?))
        }

        _ => Err(unknown_programmer_error(name)),
    }
}

fn unknown_programmer_error(name: &str) -> Box<dyn std::error::Error> {
    format!(
        "Unknown programmer: {}\nAvailable programmers: {}",
        name,
        programmer_names_short()
    )
    .into()
}
