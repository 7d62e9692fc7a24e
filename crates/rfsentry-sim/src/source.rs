//! Capture Source Abstraction
//!
//! The pipeline consumes already-materialized sample windows; anything that
//! talks to hardware, a dataset replay, or a simulator implements
//! [`CaptureSource`] and hands windows across this seam.

use rfsentry_core::types::SampleWindow;

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors a capture collaborator can return
///
/// A failed capture skips the frame; the previous spectrogram and
/// statistics are retained unchanged. Only persistently repeated failures
/// are worth surfacing to the operator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture unavailable: {0}")]
    Unavailable(String),
}

/// A collaborator that produces one sample window per frame
pub trait CaptureSource: Send {
    /// Capture one window at the currently configured size and rate
    fn capture_window(&mut self) -> CaptureResult<SampleWindow>;

    /// Sample rate of produced windows in Hz
    fn sample_rate_hz(&self) -> f64;

    /// Number of samples per produced window
    fn window_size(&self) -> usize;
}
