//! Anomaly Scoring
//!
//! Maps feature vectors to an anomaly probability and turns detections that
//! cross the threshold into anomaly events. The scoring function sits behind
//! the [`ScoringModel`] trait so a trained statistical model can replace the
//! default heuristic without touching the pipeline wiring.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::anomaly::classifier::PatternClassifier;
use crate::config::ModelParams;
use crate::types::{AnomalyEvent, Detection, PipelineError, PipelineResult, SignalFeatures};

/// Score above which a detection is emitted as an anomaly
pub const ANOMALY_THRESHOLD: f64 = 0.7;

/// Fixed placeholder event duration; no duration estimation is performed
const DEFAULT_DURATION_SEC: f64 = 1.0;

/// Process-wide counter backing unique event ids
static NEXT_EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Capability seam for the anomaly model
///
/// `score` must return a value in [0, 1] and be deterministic for identical
/// features; `train` receives the rolling buffer when it fills.
pub trait ScoringModel: Send {
    /// Anomaly probability for one feature vector, in [0, 1]
    fn score(&self, features: &SignalFeatures) -> f64;

    /// Batch retrain step invoked when the training buffer fills
    fn train(&mut self, samples: &[SignalFeatures]);
}

/// Default heuristic scoring model
///
/// Accumulates fixed weights for unusual spectral uniformity, strong SNR,
/// out-of-band bandwidth, and high time variance. A placeholder for a
/// trained model; the weights are not tuned beyond the original system.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicModel;

impl ScoringModel for HeuristicModel {
    fn score(&self, features: &SignalFeatures) -> f64 {
        let uniformity = spectral_uniformity(&features.spectral_density);
        let snr_factor = (features.snr_db / 30.0).min(1.0);
        let bandwidth_factor = (features.bandwidth_mhz / 50.0).min(1.0);

        let mut score: f64 = 0.0;
        if uniformity < 0.3 {
            score += 0.4;
        }
        if snr_factor > 0.7 {
            score += 0.3;
        }
        if !(0.2..=0.8).contains(&bandwidth_factor) {
            score += 0.2;
        }
        if features.time_variance > 0.7 {
            score += 0.1;
        }

        score.clamp(0.0, 1.0)
    }

    fn train(&mut self, samples: &[SignalFeatures]) {
        // Heuristic weights are fixed; a trained model would fit here
        debug!(samples = samples.len(), "heuristic model ignoring retrain");
    }
}

/// How uniform the spectrum is: 1 / (1 + variance / mean^2), in (0, 1]
fn spectral_uniformity(spectral_density: &[f64]) -> f64 {
    if spectral_density.is_empty() {
        return 1.0;
    }
    let n = spectral_density.len() as f64;
    let mean = spectral_density.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 1.0;
    }
    let variance = spectral_density
        .iter()
        .map(|d| (d - mean) * (d - mean))
        .sum::<f64>()
        / n;

    1.0 / (1.0 + variance / (mean * mean))
}

/// Owns the scoring model, its tuning knobs, and the rolling training buffer
pub struct AnomalyDetector {
    model: Box<dyn ScoringModel>,
    params: ModelParams,
    training_buffer: Vec<SignalFeatures>,
    ready: bool,
}

impl AnomalyDetector {
    /// Create a detector around the default heuristic model
    pub fn new(params: ModelParams) -> Self {
        Self::with_model(params, Box::new(HeuristicModel))
    }

    /// Create a detector around a custom scoring model
    pub fn with_model(params: ModelParams, model: Box<dyn ScoringModel>) -> Self {
        info!(
            batch_size = params.batch_size,
            model_kind = ?params.model_kind,
            "anomaly model initialized"
        );
        Self {
            model,
            params,
            training_buffer: Vec::new(),
            ready: true,
        }
    }

    /// Whether scoring is allowed yet
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Feature vectors currently waiting for the next retrain
    pub fn pending_training_samples(&self) -> usize {
        self.training_buffer.len()
    }

    /// Score one feature vector, in [0, 1]
    pub fn score(&self, features: &SignalFeatures) -> PipelineResult<f64> {
        if !self.ready {
            return Err(PipelineError::ModelNotReady);
        }
        Ok(self.model.score(features))
    }

    /// Score each detection and emit events for those above threshold
    ///
    /// Every scored feature vector joins the rolling training buffer; when
    /// the buffer reaches the configured batch size a retrain runs and the
    /// buffer is cleared. When a classifier is supplied, emitted events
    /// carry its classification.
    pub fn detect(
        &mut self,
        scored: &[(Detection, SignalFeatures)],
        classifier: Option<&PatternClassifier>,
    ) -> PipelineResult<Vec<AnomalyEvent>> {
        if !self.ready {
            return Err(PipelineError::ModelNotReady);
        }

        let mut events = Vec::new();
        for (detection, features) in scored {
            let score = self.model.score(features);

            if score > ANOMALY_THRESHOLD {
                let classification = classifier.and_then(|c| c.classify(features));
                events.push(AnomalyEvent {
                    id: next_event_id(detection.timestamp_ms),
                    timestamp_ms: detection.timestamp_ms,
                    frequency_mhz: detection.frequency_mhz,
                    confidence: score,
                    signal_strength: detection.amplitude,
                    duration_sec: DEFAULT_DURATION_SEC,
                    is_classified: classification.is_some(),
                    classification,
                });
            }

            self.training_buffer.push(features.clone());
            if self.training_buffer.len() >= self.params.batch_size {
                info!(
                    samples = self.training_buffer.len(),
                    "retraining anomaly model"
                );
                self.model.train(&self.training_buffer);
                self.training_buffer.clear();
            }
        }

        Ok(events)
    }
}

/// Process-unique event id built from the timestamp and a global counter
fn next_event_id(timestamp_ms: u64) -> String {
    let seq = NEXT_EVENT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("anomaly-{}-{}", timestamp_ms, seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Modulation;

    fn features(
        spectral_density: Vec<f64>,
        snr_db: f64,
        bandwidth_mhz: f64,
        time_variance: f64,
    ) -> SignalFeatures {
        SignalFeatures {
            spectral_density,
            peak_frequencies_mhz: vec![2450.0],
            snr_db,
            bandwidth_mhz,
            time_variance,
            modulation: Modulation::Unknown,
        }
    }

    fn detection() -> Detection {
        Detection {
            frequency_mhz: 2450.0,
            amplitude: 0.8,
            confidence: 0.9,
            timestamp_ms: 1_000,
            is_anomaly: false,
        }
    }

    /// Spiky density, strong SNR, narrow bandwidth, busy time domain:
    /// trips every heuristic term
    fn anomalous_features() -> SignalFeatures {
        let mut density = vec![0.001; 64];
        density[10] = 5.0;
        features(density, 28.0, 1.0, 0.9)
    }

    #[test]
    fn test_score_bounds_and_determinism() {
        let detector = AnomalyDetector::new(ModelParams::default());

        let f = anomalous_features();
        let a = detector.score(&f).unwrap();
        let b = detector.score(&f).unwrap();

        assert!((0.0..=1.0).contains(&a));
        assert_eq!(a, b);
    }

    #[test]
    fn test_anomalous_features_cross_threshold() {
        let detector = AnomalyDetector::new(ModelParams::default());
        let score = detector.score(&anomalous_features()).unwrap();
        // 0.4 + 0.3 + 0.2 + 0.1
        assert!(score > ANOMALY_THRESHOLD);
    }

    #[test]
    fn test_uniform_quiet_features_score_low() {
        let detector = AnomalyDetector::new(ModelParams::default());
        // Flat density, modest SNR, mid-band bandwidth, calm time domain
        let score = detector
            .score(&features(vec![0.5; 64], 5.0, 25.0, 0.1))
            .unwrap();
        assert!(score < ANOMALY_THRESHOLD);
    }

    #[test]
    fn test_detect_emits_event_with_unique_ids() {
        let mut detector = AnomalyDetector::new(ModelParams::default());
        let scored = vec![
            (detection(), anomalous_features()),
            (detection(), anomalous_features()),
        ];

        let events = detector.detect(&scored, None).unwrap();

        assert_eq!(events.len(), 2);
        assert_ne!(events[0].id, events[1].id);
        assert!((events[0].duration_sec - 1.0).abs() < 1e-9);
        assert!(events[0].confidence > ANOMALY_THRESHOLD);
        assert!(!events[0].is_classified);
    }

    #[test]
    fn test_training_buffer_clears_at_batch_size() {
        let params = ModelParams {
            batch_size: 3,
            ..Default::default()
        };
        let mut detector = AnomalyDetector::new(params);
        let quiet = features(vec![0.5; 64], 5.0, 25.0, 0.1);

        detector
            .detect(&[(detection(), quiet.clone()), (detection(), quiet.clone())], None)
            .unwrap();
        assert_eq!(detector.pending_training_samples(), 2);

        detector.detect(&[(detection(), quiet)], None).unwrap();
        assert_eq!(detector.pending_training_samples(), 0);
    }

    #[test]
    fn test_spectral_uniformity_guards() {
        assert_eq!(spectral_uniformity(&[]), 1.0);
        assert_eq!(spectral_uniformity(&[0.0, 0.0]), 1.0);
        // Flat density is perfectly uniform
        assert!((spectral_uniformity(&[0.4; 32]) - 1.0).abs() < 1e-12);
    }
}
