//! Signal Analysis Module
//!
//! The per-frame analysis chain: spectral transform, peak detection,
//! feature extraction, spectrogram aggregation, and active-signal tracking.
//!
//! ## Example
//!
//! ```rust
//! use rfsentry_core::analysis::{PeakFinder, SpectrumAnalyzer};
//! use rfsentry_core::types::SampleWindow;
//!
//! let samples: Vec<f64> = (0..1024)
//!     .map(|i| (2.0 * std::f64::consts::PI * 100e3 * i as f64 / 2.4e6).sin())
//!     .collect();
//! let window = SampleWindow::new(samples, 2.4e6);
//!
//! let mut analyzer = SpectrumAnalyzer::new(1024);
//! let frame = analyzer.compute(&window).unwrap();
//!
//! let floor = PeakFinder::threshold_for_sensitivity(&frame, 0.5);
//! let peaks = PeakFinder::new().with_threshold(floor).find_peaks(&frame);
//! assert!(!peaks.is_empty());
//! ```

pub mod features;
pub mod peaks;
pub mod spectrogram;
pub mod spectrum;
pub mod tracker;

pub use features::{FeatureExtractor, PEAK_FREQUENCY_COUNT};
pub use peaks::{PeakFinder, SpectralPeak};
pub use spectrogram::{SpectrogramAggregator, SpectrogramGrid};
pub use spectrum::{SpectralFrame, SpectrumAnalyzer};
pub use tracker::{ActiveSignalTracker, SignalStatistics};
