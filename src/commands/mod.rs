//! CLI command implementations
//!
//! Every command opens the programmer, builds a [`ProgramWorkflow`] for the
//! selected device and runs one or more passes through it. Shutdown of the
//! socket is handled by the workflow itself.

mod image;
mod list;
mod progress;
mod read;
mod verify;
mod write;

use rprom_core::device::{DeviceDatabase, DeviceProfile};
use rprom_core::program::ProgramWorkflow;
use rprom_core::protocol::{EpromController, PollPolicy};

use crate::cli::TargetArgs;
use crate::programmers::{self, BoxedTransport};
use crate::signal;

pub use list::{list_devices, list_programmers};
pub use read::run_read;
pub use verify::run_verify;
pub use write::run_write;

/// An open programmer with the selected device profile
pub struct Session {
    controller: EpromController<BoxedTransport>,
    profile: DeviceProfile,
}

impl Session {
    /// Look up the device and open the programmer
    pub fn open(target: &TargetArgs, db: &DeviceDatabase) -> Result<Self, Box<dyn std::error::Error>> {
        let profile = db.find(&target.device).cloned().ok_or_else(|| {
            let names: Vec<&str> = db.iter().map(|d| d.name.as_str()).collect();
            format!(
                "Unknown device: {}\nAvailable devices: {}",
                target.device,
                names.join(", ")
            )
        })?;
        log::info!("Selected device {}", profile);

        let transport = programmers::open_programmer(&target.programmer, &profile)?;
        let mut controller = EpromController::new(transport);
        if let Some(max_polls) = target.max_polls {
            controller = controller.with_poll_policy(PollPolicy::Bounded { max_polls });
        }

        Ok(Self {
            controller,
            profile,
        })
    }

    /// Workflow over this session, stopped by Ctrl-C
    pub fn workflow(&mut self) -> ProgramWorkflow<'_, BoxedTransport> {
        ProgramWorkflow::new(&mut self.controller, &self.profile)
            .with_interrupt(signal::interrupt_flag())
    }

    /// The selected device
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }
}
