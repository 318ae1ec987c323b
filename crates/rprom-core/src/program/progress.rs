//! Progress reporting for workflow passes

/// Bytes between two progress callbacks
pub const PROGRESS_INTERVAL: usize = 16;

/// Which pass is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Programming bytes
    Writing,
    /// Reading bytes back into a buffer
    Reading,
    /// Comparing device contents with expected data
    Verifying,
}

impl Phase {
    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Phase::Writing => "Writing",
            Phase::Reading => "Reading",
            Phase::Verifying => "Verifying",
        }
    }
}

/// Callback for progress reporting during a pass
///
/// Purely a side channel: nothing a reporter does affects the result of the
/// pass.
pub trait ProgressReporter {
    /// Called once the device is initialised and the pass starts
    ///
    /// `total_bytes` is `None` when the length is not known up front
    /// (streamed hex input).
    fn begin(&mut self, phase: Phase, total_bytes: Option<usize>);

    /// Called every [`PROGRESS_INTERVAL`] bytes with the device address
    /// the next byte goes to
    fn advance(&mut self, address: u32, bytes_done: usize);

    /// Called when the pass completes successfully
    fn end(&mut self, phase: Phase, bytes_done: usize);
}

/// A no-op progress reporter
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn begin(&mut self, _phase: Phase, _total_bytes: Option<usize>) {}
    fn advance(&mut self, _address: u32, _bytes_done: usize) {}
    fn end(&mut self, _phase: Phase, _bytes_done: usize) {}
}
