//! CLI argument parsing

use crate::programmers;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rprom_core::device::Vpp;
use std::path::{Path, PathBuf};

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a byte count, hex or decimal
fn parse_count(s: &str) -> Result<usize, String> {
    parse_hex_u32(s).map(|n| n as usize)
}

/// Parse a programming voltage name
fn parse_vpp(s: &str) -> Result<Vpp, String> {
    Vpp::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = Vpp::ALL.iter().map(|v| v.name()).collect();
        format!("Unknown voltage '{}' [available: {}]", s, names.join(", "))
    })
}

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer to use [available: {}]",
        programmers::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "rprom")]
#[command(author, version, about = "Parallel EPROM programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Device database file (RON) replacing the built-in device table
    #[arg(long, global = true)]
    pub device_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Image file format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Intel HEX
    Hex,
    /// Raw binary
    Bin,
}

impl ImageFormat {
    /// Pick the format from an explicit choice or the file extension
    pub fn resolve(explicit: Option<ImageFormat>, path: &Path) -> ImageFormat {
        explicit.unwrap_or_else(|| {
            match path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .as_deref()
            {
                Some("hex" | "ihx" | "ihex") => ImageFormat::Hex,
                _ => ImageFormat::Bin,
            }
        })
    }
}

/// Programmer and device selection shared across commands
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Programmer to use
    #[arg(short, long, default_value = "usbtiny", help = programmer_help())]
    pub programmer: String,

    /// EPROM device type (see list-devices)
    #[arg(short, long)]
    pub device: String,

    /// Give up after this many busy status polls (default: wait forever)
    #[arg(long)]
    pub max_polls: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Program an image into the EPROM
    Write {
        #[command(flatten)]
        target: TargetArgs,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (default: from file extension)
        #[arg(short, long, value_enum)]
        format: Option<ImageFormat>,

        /// Programming voltage (5v, 12v or 21v)
        #[arg(long, required = true, value_parser = parse_vpp)]
        vpp: Vpp,

        /// Start address for binary images
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes to write from a binary image
        #[arg(short, long, value_parser = parse_count)]
        count: Option<usize>,

        /// Read back and compare after writing
        #[arg(long)]
        verify: bool,
    },

    /// Read EPROM contents to a binary file
    Read {
        #[command(flatten)]
        target: TargetArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes to read (default: to the end of the device)
        #[arg(short, long, value_parser = parse_count)]
        count: Option<usize>,
    },

    /// Compare EPROM contents with an image
    Verify {
        #[command(flatten)]
        target: TargetArgs,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (default: from file extension)
        #[arg(short, long, value_enum)]
        format: Option<ImageFormat>,

        /// Start address for binary images
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes to compare from a binary image
        #[arg(short, long, value_parser = parse_count)]
        count: Option<usize>,
    },

    /// List supported EPROM devices
    ListDevices,

    /// List supported programmers
    ListProgrammers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x1000"), Ok(0x1000));
        assert_eq!(parse_hex_u32("0XfF"), Ok(0xFF));
        assert_eq!(parse_hex_u32("4096"), Ok(4096));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert!(parse_hex_u32("-1").is_err());
    }

    #[test]
    fn test_parse_vpp() {
        assert_eq!(parse_vpp("12V"), Ok(Vpp::V12));
        assert!(parse_vpp("25v").unwrap_err().contains("21v"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ImageFormat::resolve(None, Path::new("rom.HEX")),
            ImageFormat::Hex
        );
        assert_eq!(
            ImageFormat::resolve(None, Path::new("rom.bin")),
            ImageFormat::Bin
        );
        assert_eq!(
            ImageFormat::resolve(Some(ImageFormat::Bin), Path::new("rom.hex")),
            ImageFormat::Bin
        );
    }

    #[test]
    fn test_cli_parses_write() {
        let cli = Cli::try_parse_from([
            "rprom", "-vv", "write", "-d", "27256", "-i", "rom.bin", "--vpp", "12v", "-a",
            "0x100", "--verify",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Write {
                target,
                vpp,
                address,
                verify,
                count,
                ..
            } => {
                assert_eq!(target.programmer, "usbtiny");
                assert_eq!(target.device, "27256");
                assert_eq!(vpp, Vpp::V12);
                assert_eq!(address, 0x100);
                assert!(verify);
                assert_eq!(count, None);
            }
            _ => panic!("expected write"),
        }
    }

    #[test]
    fn test_write_requires_vpp() {
        let err = Cli::try_parse_from(["rprom", "write", "-d", "2764", "-i", "rom.bin"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("--vpp"));
    }
}
