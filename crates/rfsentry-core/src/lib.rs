//! # rfsentry-core
//!
//! Signal-analysis and anomaly-scoring core: turns raw RF sample windows
//! into classified anomaly events and a time-frequency intensity grid.
//!
//! ## Pipeline
//!
//! ```text
//! SampleWindow
//!     │
//!     ▼
//! ┌──────────────┐   ┌────────────┐   ┌──────────────────┐
//! │ Spectral     │──►│ Peak       │──►│ Feature          │
//! │ Transform    │   │ Detection  │   │ Extraction       │
//! └──────────────┘   └────────────┘   └──────────────────┘
//!                          │                  │
//!                          ▼                  ▼
//!                    ┌────────────┐   ┌──────────────────┐
//!                    │ Tracker /  │   │ Anomaly Scoring  │
//!                    │ Spectrogram│   │ + Classification │
//!                    └────────────┘   └──────────────────┘
//! ```
//!
//! One frame = one window through the whole chain, in strict stage order.
//! The core never blocks on I/O; capture drivers hand it materialized
//! [`types::SampleWindow`] data and run the loop (see `rfsentry-cli`).
//!
//! ## Example
//!
//! ```rust
//! use rfsentry_core::config::{DetectionConfig, ModelParams};
//! use rfsentry_core::pipeline::Pipeline;
//! use rfsentry_core::types::SampleWindow;
//!
//! let mut pipeline = Pipeline::new(DetectionConfig::default(), ModelParams::default());
//!
//! let samples: Vec<f64> = (0..1024)
//!     .map(|i| 0.8 * (2.0 * std::f64::consts::PI * 300e3 * i as f64 / 2.4e6).sin())
//!     .collect();
//! let window = SampleWindow::new(samples, 2.4e6);
//!
//! let output = pipeline.process_frame(&window, 0).unwrap();
//! assert!(!output.detections.is_empty());
//! ```

pub mod analysis;
pub mod anomaly;
pub mod config;
pub mod fft_utils;
pub mod pipeline;
pub mod types;

pub use analysis::{
    ActiveSignalTracker, FeatureExtractor, PeakFinder, SignalStatistics, SpectralFrame,
    SpectralPeak, SpectrogramAggregator, SpectrogramGrid, SpectrumAnalyzer,
};
pub use anomaly::{
    AnomalyDetector, AnomalyHistory, HeuristicModel, PatternClassifier, ScoringModel,
    ANOMALY_THRESHOLD,
};
pub use config::{DetectionConfig, ModelParams};
pub use pipeline::{FrameOutput, Pipeline};
pub use types::{
    AnomalyEvent, Detection, Modulation, PipelineError, PipelineResult, SampleWindow,
    SignalFeatures,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{DetectionConfig, ModelParams};
    pub use crate::pipeline::{FrameOutput, Pipeline};
    pub use crate::types::{AnomalyEvent, Detection, SampleWindow, SignalFeatures};
}
