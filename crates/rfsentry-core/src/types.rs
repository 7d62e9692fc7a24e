//! Core types for RF spectrum analysis
//!
//! This module defines the fundamental types that flow through the detection
//! pipeline: time-domain capture windows, candidate signal detections, the
//! per-detection feature vector, and classified anomaly events.
//!
//! All frequency fields on pipeline outputs are absolute frequencies in MHz
//! (the capture is assumed downconverted from the configured band start, the
//! way a tuned SDR front-end delivers baseband samples). Timestamps are
//! milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};

/// A floating point amplitude sample (real-valued capture)
pub type Sample = f64;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur during a pipeline frame
///
/// All of these are local to one frame: the frame loop skips the frame and
/// proceeds, retaining the previous spectrogram and statistics.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid sample window: {0}")]
    InvalidWindow(String),

    #[error("Empty sample window")]
    EmptyWindow,

    #[error("Anomaly model is not ready")]
    ModelNotReady,
}

/// One fixed-length block of time-domain amplitude samples
///
/// A window is captured once per pipeline frame and owned by that frame;
/// nothing downstream retains it.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    /// Amplitude samples in capture order
    pub samples: Vec<Sample>,
    /// Sample rate in Hz
    pub sample_rate_hz: f64,
}

impl SampleWindow {
    /// Create a window from samples and the rate they were captured at
    pub fn new(samples: Vec<Sample>, sample_rate_hz: f64) -> Self {
        Self {
            samples,
            sample_rate_hz,
        }
    }

    /// Number of samples in the window
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A candidate signal found by peak search in one spectral frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Center frequency in MHz
    pub frequency_mhz: f64,
    /// Peak magnitude at the detection bin
    pub amplitude: f64,
    /// How much the peak stands out from its local noise, in [0, 1]
    pub confidence: f64,
    /// Capture time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// Set once the anomaly scorer has judged this detection anomalous
    pub is_anomaly: bool,
}

/// Modulation class estimated from spectral flatness and zero crossings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Modulation {
    Am,
    Fm,
    Fsk,
    #[default]
    Unknown,
}

impl std::fmt::Display for Modulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modulation::Am => write!(f, "AM"),
            Modulation::Fm => write!(f, "FM"),
            Modulation::Fsk => write!(f, "FSK"),
            Modulation::Unknown => write!(f, "unknown"),
        }
    }
}

/// Derived numeric summary of one detection, consumed by the anomaly scorer
/// and the pattern classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFeatures {
    /// Squared magnitude per spectral bin (same length as the frame)
    pub spectral_density: Vec<f64>,
    /// Top-K bin frequencies in MHz, sorted by descending magnitude
    pub peak_frequencies_mhz: Vec<f64>,
    /// Signal-to-noise ratio in dB
    pub snr_db: f64,
    /// -3 dB bandwidth estimate in MHz
    pub bandwidth_mhz: f64,
    /// Population variance of the time-domain window
    pub time_variance: f64,
    /// Estimated modulation class
    pub modulation: Modulation,
}

/// A detection judged anomalous above threshold, optionally classified
///
/// Events are immutable once emitted and deduplicated by `id` downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    /// Process-unique identifier
    pub id: String,
    /// Timestamp of the underlying detection, milliseconds since epoch
    pub timestamp_ms: u64,
    /// Center frequency in MHz
    pub frequency_mhz: f64,
    /// Anomaly score that crossed the threshold, in (0.7, 1]
    pub confidence: f64,
    /// Amplitude of the underlying detection
    pub signal_strength: f64,
    /// Nominal event duration in seconds (fixed placeholder, no estimation)
    pub duration_sec: f64,
    /// Pattern name when the classifier produced a match
    pub classification: Option<String>,
    /// True when `classification` is populated
    pub is_classified: bool,
}
