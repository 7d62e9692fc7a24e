//! Pipeline Orchestration
//!
//! Wires the analysis chain into one per-frame pass:
//! samples → transform → peaks → detections → features → score → classify
//! → aggregate. Stages run in strict dependency order within a frame; the
//! pipeline is single-writer and frame-sequential, so no locking is needed.
//!
//! Per-frame errors are local: the caller skips the frame, keeps its
//! previous spectrogram and statistics, and the loop continues.

use tracing::{debug, warn};

use crate::analysis::{
    ActiveSignalTracker, FeatureExtractor, PeakFinder, SignalStatistics, SpectrogramAggregator,
    SpectrogramGrid, SpectrumAnalyzer,
};
use crate::anomaly::{AnomalyDetector, PatternClassifier};
use crate::config::{DetectionConfig, ModelParams};
use crate::types::{
    AnomalyEvent, Detection, PipelineResult, SampleWindow, SignalFeatures,
};

/// Everything one frame emits
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Signals found in this frame's spectral pass
    pub detections: Vec<Detection>,
    /// Detections judged anomalous above threshold
    pub anomalies: Vec<AnomalyEvent>,
    /// Fresh grid over the trailing window, replaces any prior grid
    pub spectrogram: SpectrogramGrid,
    /// Running statistics after this frame
    pub statistics: SignalStatistics,
}

/// The per-frame signal analysis pipeline
pub struct Pipeline {
    config: DetectionConfig,
    analyzer: SpectrumAnalyzer,
    extractor: FeatureExtractor,
    detector: AnomalyDetector,
    classifier: PatternClassifier,
    aggregator: SpectrogramAggregator,
    tracker: ActiveSignalTracker,
}

impl Pipeline {
    /// Build a pipeline for a configuration snapshot and model parameters
    pub fn new(config: DetectionConfig, params: ModelParams) -> Self {
        let analyzer = SpectrumAnalyzer::new(config.window_size);
        let extractor = FeatureExtractor::new(config.window_size, config.base_frequency_mhz());
        let aggregator = SpectrogramAggregator::new(config.frequency_range_mhz);

        Self {
            config,
            analyzer,
            extractor,
            detector: AnomalyDetector::new(params),
            classifier: PatternClassifier::new(),
            aggregator,
            tracker: ActiveSignalTracker::default(),
        }
    }

    /// Swap in a new configuration snapshot before the next frame
    ///
    /// Size- and band-dependent stages are rebuilt; the tracker, the
    /// pattern library, and the training buffer carry over.
    pub fn update_config(&mut self, config: DetectionConfig) {
        if config.window_size != self.config.window_size {
            self.analyzer = SpectrumAnalyzer::new(config.window_size);
        }
        self.extractor =
            FeatureExtractor::new(config.window_size, config.base_frequency_mhz());
        self.aggregator = SpectrogramAggregator::new(config.frequency_range_mhz);
        self.config = config;
    }

    /// Current configuration snapshot
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Access the pattern library, e.g. to learn operator-supplied patterns
    pub fn classifier_mut(&mut self) -> &mut PatternClassifier {
        &mut self.classifier
    }

    /// Run one full frame over a captured window
    ///
    /// A returned error means the frame produced nothing and mutated
    /// neither the tracker, the training buffer, nor the pattern library;
    /// the caller keeps its previous output.
    pub fn process_frame(
        &mut self,
        window: &SampleWindow,
        now_ms: u64,
    ) -> PipelineResult<FrameOutput> {
        let frame = self.analyzer.compute(window)?;

        let floor = PeakFinder::threshold_for_sensitivity(&frame, self.config.sensitivity);
        let peaks = PeakFinder::new().with_threshold(floor).find_peaks(&frame);

        let base_mhz = self.config.base_frequency_mhz();
        let mut detections: Vec<Detection> = peaks
            .iter()
            .map(|p| Detection {
                frequency_mhz: base_mhz + p.frequency_hz / 1e6,
                amplitude: p.magnitude,
                confidence: p.confidence,
                timestamp_ms: now_ms,
                is_anomaly: false,
            })
            .collect();

        let mut anomalies = Vec::new();
        if self.config.ai_enabled {
            let mut scored: Vec<(Detection, SignalFeatures)> =
                Vec::with_capacity(detections.len());
            for detection in &detections {
                match self.extractor.extract(detection, window) {
                    Ok(features) => scored.push((*detection, features)),
                    Err(err) => {
                        // Feature failure drops this detection, not the frame
                        warn!(
                            frequency_mhz = detection.frequency_mhz,
                            %err,
                            "feature extraction failed, skipping detection"
                        );
                    }
                }
            }

            let classifier = self.config.auto_classify.then_some(&self.classifier);
            anomalies = self.detector.detect(&scored, classifier)?;

            for event in &anomalies {
                if let Some(detection) = detections
                    .iter_mut()
                    .find(|d| d.frequency_mhz == event.frequency_mhz)
                {
                    detection.is_anomaly = true;
                }
            }
        }

        self.tracker.observe(&detections, now_ms);
        let spectrogram = self.aggregator.aggregate(self.tracker.active(), now_ms);
        let statistics = self.tracker.statistics();

        debug!(
            detections = detections.len(),
            anomalies = anomalies.len(),
            signals_processed = statistics.signals_processed,
            "frame complete"
        );

        Ok(FrameOutput {
            detections,
            anomalies,
            spectrogram,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PipelineError;
    use std::f64::consts::PI;

    fn test_config() -> DetectionConfig {
        DetectionConfig {
            frequency_range_mhz: (2400.0, 2500.0),
            sensitivity: 0.1,
            sampling_rate_mhz: 2.4,
            window_size: 1024,
            ai_enabled: true,
            auto_classify: true,
            known_signals: Vec::new(),
        }
    }

    /// Window with one clean tone at the given baseband offset
    fn tone_window(offset_hz: f64, amplitude: f64) -> SampleWindow {
        let sample_rate = 2.4e6;
        let samples: Vec<f64> = (0..1024)
            .map(|i| amplitude * (2.0 * PI * offset_hz * i as f64 / sample_rate).sin())
            .collect();
        SampleWindow::new(samples, sample_rate)
    }

    #[test]
    fn test_single_tone_yields_single_detection() {
        let mut pipeline = Pipeline::new(test_config(), ModelParams::default());
        // Offset lands exactly on bin 256
        let window = tone_window(600e3, 0.8);

        let output = pipeline.process_frame(&window, 1_000).unwrap();

        assert_eq!(output.detections.len(), 1);
        let detection = &output.detections[0];
        assert!((detection.frequency_mhz - 2400.6).abs() < 0.01);
        assert!(detection.confidence > 0.0 && detection.confidence <= 1.0);
        assert_eq!(output.statistics.signals_processed, 1);
    }

    #[test]
    fn test_invalid_window_skips_frame_and_keeps_state() {
        let mut pipeline = Pipeline::new(test_config(), ModelParams::default());
        pipeline
            .process_frame(&tone_window(600e3, 0.8), 1_000)
            .unwrap();

        let mut bad = tone_window(600e3, 0.8);
        bad.samples[10] = f64::NAN;
        let err = pipeline.process_frame(&bad, 2_000).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWindow(_)));

        // Tracker state untouched by the failed frame
        let output = pipeline
            .process_frame(&tone_window(600e3, 0.8), 3_000)
            .unwrap();
        assert_eq!(output.statistics.signals_processed, 2);
    }

    #[test]
    fn test_ai_disabled_emits_no_anomalies() {
        let config = DetectionConfig {
            ai_enabled: false,
            ..test_config()
        };
        let mut pipeline = Pipeline::new(config, ModelParams::default());

        let output = pipeline
            .process_frame(&tone_window(600e3, 0.9), 1_000)
            .unwrap();

        assert!(!output.detections.is_empty());
        assert!(output.anomalies.is_empty());
        assert_eq!(output.statistics.potential_threats, 0);
    }

    #[test]
    fn test_anomalous_tone_is_flagged_and_classified() {
        let mut pipeline = Pipeline::new(test_config(), ModelParams::default());
        // Strong clean tone: spiky spectrum, high SNR, narrow bandwidth
        let output = pipeline
            .process_frame(&tone_window(600e3, 0.9), 1_000)
            .unwrap();

        assert!(
            !output.anomalies.is_empty(),
            "clean strong tone should trip the heuristic scorer"
        );
        let event = &output.anomalies[0];
        assert!(event.confidence > 0.7);
        assert!(event.is_classified);
        assert!(output.detections.iter().any(|d| d.is_anomaly));
        assert_eq!(output.statistics.potential_threats, 1);
    }

    #[test]
    fn test_spectrogram_covers_configured_band() {
        let mut pipeline = Pipeline::new(test_config(), ModelParams::default());
        let output = pipeline
            .process_frame(&tone_window(600e3, 0.8), 5_000)
            .unwrap();

        let grid = &output.spectrogram;
        assert_eq!(grid.dimensions(), (100, 100));
        assert!((grid.frequencies_mhz[0] - 2400.0).abs() < 1e-9);
        // The 2400.6 MHz detection lands in the first frequency column
        assert!(grid.peak_intensity() > 0.0);
    }

    #[test]
    fn test_update_config_swaps_window_size() {
        let mut pipeline = Pipeline::new(test_config(), ModelParams::default());
        pipeline.update_config(DetectionConfig {
            window_size: 512,
            ..test_config()
        });

        // Old-size windows are now invalid, new-size windows pass
        assert!(pipeline.process_frame(&tone_window(600e3, 0.8), 0).is_err());

        let samples: Vec<f64> = (0..512)
            .map(|i| 0.8 * (2.0 * PI * 600e3 * i as f64 / 2.4e6).sin())
            .collect();
        let window = SampleWindow::new(samples, 2.4e6);
        assert!(pipeline.process_frame(&window, 0).is_ok());
    }
}
