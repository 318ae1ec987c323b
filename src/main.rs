//! rprom - Parallel EPROM programmer
//!
//! Drives 27xx-series EPROMs through a USBtiny-class programmer running the
//! EPROM firmware.
//!
//! # Architecture
//!
//! The binary is a thin shell over `rprom-core`:
//! - A **programmer** (USBtiny over USB, or the in-memory dummy) provides the
//!   raw vendor control transfers
//! - The core **EPROM controller** turns those into device commands
//! - A **workflow** runs one write, read or verify pass and always leaves the
//!   socket powered down

mod cli;
mod commands;
mod programmers;
mod signal;

use clap::Parser;
use cli::{Cli, Commands, ImageFormat};
use commands::Session;
use rprom_core::device::DeviceDatabase;
use std::path::Path;

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let db = match load_device_database(cli.device_db.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load device database: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("Loaded {} device definitions", db.len());

    if let Err(e) = run(cli.command, &db) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, db: &DeviceDatabase) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Write {
            target,
            input,
            format,
            vpp,
            address,
            count,
            verify,
        } => {
            signal::install_handler()?;
            let mut session = Session::open(&target, db)?;
            let format = ImageFormat::resolve(format, &input);
            commands::run_write(&mut session, &input, format, vpp, address, count, verify)
        }
        Commands::Read {
            target,
            output,
            address,
            count,
        } => {
            signal::install_handler()?;
            let mut session = Session::open(&target, db)?;
            commands::run_read(&mut session, &output, address, count)
        }
        Commands::Verify {
            target,
            input,
            format,
            address,
            count,
        } => {
            signal::install_handler()?;
            let mut session = Session::open(&target, db)?;
            let format = ImageFormat::resolve(format, &input);
            commands::run_verify(&mut session, &input, format, address, count)
        }
        Commands::ListDevices => {
            commands::list_devices(db);
            Ok(())
        }
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
    }
}

/// Load the device database from the specified file or use the built-in table
fn load_device_database(path: Option<&Path>) -> Result<DeviceDatabase, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let db = DeviceDatabase::load_file(path)?;
            if db.is_empty() {
                return Err(format!("{} defines no devices", path.display()).into());
            }
            log::info!("Using device database {}", path.display());
            Ok(db)
        }
        None => Ok(DeviceDatabase::builtin()),
    }
}
