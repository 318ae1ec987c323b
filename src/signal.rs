//! Ctrl-C handling
//!
//! SIGINT only raises a flag. Workflow passes check it between bytes, stop,
//! and still run the shutdown sequence so the socket is left unpowered.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Flag raised by the SIGINT handler
pub fn interrupt_flag() -> &'static AtomicBool {
    &INTERRUPTED
}

#[cfg(unix)]
extern "C" fn on_sigint(_signal: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT to the interrupt flag
#[cfg(unix)]
pub fn install_handler() -> Result<(), Box<dyn std::error::Error>> {
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

    let action = SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::empty(),
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe
    unsafe { sigaction(Signal::SIGINT, &action) }?;
    log::debug!("SIGINT handler installed");
    Ok(())
}

/// Route SIGINT to the interrupt flag
#[cfg(not(unix))]
pub fn install_handler() -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("No SIGINT handler on this platform");
    Ok(())
}

