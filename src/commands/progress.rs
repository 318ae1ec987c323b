//! Progress reporting with indicatif

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rprom_core::program::{Phase, ProgressReporter};

/// Progress reporter using indicatif progress bars
///
/// Passes with a known length get a bar; streamed hex input gets a spinner
/// showing the current address.
#[derive(Default)]
pub struct IndicatifProgress {
    current_bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_bar(&mut self, total: u64, phase: Phase) {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                    phase.label()
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.current_bar = Some(pb);
    }

    fn create_spinner(&mut self, phase: Phase) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("{}...", phase.label()));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.current_bar = Some(pb);
    }
}

impl ProgressReporter for IndicatifProgress {
    fn begin(&mut self, phase: Phase, total_bytes: Option<usize>) {
        match total_bytes {
            Some(total) => self.create_bar(total as u64, phase),
            None => self.create_spinner(phase),
        }
    }

    fn advance(&mut self, address: u32, bytes_done: usize) {
        if let Some(pb) = &self.current_bar {
            if pb.length().is_some() {
                pb.set_position(bytes_done as u64);
            } else {
                pb.set_message(format!("{} bytes, at 0x{:05X}", bytes_done, address));
            }
        }
    }

    fn end(&mut self, phase: Phase, bytes_done: usize) {
        if let Some(pb) = self.current_bar.take() {
            pb.set_position(bytes_done as u64);
            pb.finish_with_message(format!("{} complete", phase.label()));
        }
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        // A failed pass never reaches end(); don't leave the bar spinning
        if let Some(pb) = self.current_bar.take() {
            pb.abandon();
        }
    }
}
