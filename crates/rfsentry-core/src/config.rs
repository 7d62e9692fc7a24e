//! Detection and model configuration
//!
//! Configuration arrives as an immutable snapshot; the pipeline picks up a
//! new snapshot between frames, never mid-frame.

use serde::{Deserialize, Serialize};

use crate::types::Modulation;

/// Threat level attached to a known signal profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// A named signal the operator already knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownSignalProfile {
    /// Human-readable name (WiFi, Bluetooth, ...)
    pub name: String,
    /// Nominal center frequency in MHz
    pub frequency_mhz: f64,
    /// Expected modulation, when known
    pub modulation: Option<Modulation>,
    /// How concerning a match is
    pub threat: ThreatLevel,
}

/// Immutable per-frame detection configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Monitored band as (min, max) in MHz
    pub frequency_range_mhz: (f64, f64),
    /// Normalized peak sensitivity in [0, 1]
    pub sensitivity: f64,
    /// Capture sample rate in MHz
    pub sampling_rate_mhz: f64,
    /// Samples per capture window
    pub window_size: usize,
    /// Gate for anomaly scoring
    pub ai_enabled: bool,
    /// Gate for pattern classification of scored anomalies
    pub auto_classify: bool,
    /// Operator-supplied signal profiles
    pub known_signals: Vec<KnownSignalProfile>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            frequency_range_mhz: (2400.0, 2500.0),
            sensitivity: 0.5,
            sampling_rate_mhz: 2.4,
            window_size: 1024,
            ai_enabled: true,
            auto_classify: true,
            known_signals: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Capture sample rate in Hz
    pub fn sample_rate_hz(&self) -> f64 {
        self.sampling_rate_mhz * 1e6
    }

    /// Band start in MHz (the assumed downconversion frequency)
    pub fn base_frequency_mhz(&self) -> f64 {
        self.frequency_range_mhz.0
    }

    /// Width of the monitored band in MHz
    pub fn span_mhz(&self) -> f64 {
        self.frequency_range_mhz.1 - self.frequency_range_mhz.0
    }

    /// Known signal profile nearest the given frequency, within tolerance
    pub fn match_known_signal(&self, frequency_mhz: f64) -> Option<&KnownSignalProfile> {
        const TOLERANCE_MHZ: f64 = 1.0;
        self.known_signals
            .iter()
            .filter(|p| (p.frequency_mhz - frequency_mhz).abs() <= TOLERANCE_MHZ)
            .min_by(|a, b| {
                (a.frequency_mhz - frequency_mhz)
                    .abs()
                    .partial_cmp(&(b.frequency_mhz - frequency_mhz).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Kind of anomaly model behind the scoring seam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    #[default]
    Unsupervised,
    SemiSupervised,
}

/// Feature-extraction strategy a trained model would use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureExtractionKind {
    Pca,
    Autoencoder,
    #[default]
    Wavelet,
}

/// Opaque tuning knobs passed through to the scoring model
///
/// The default heuristic model only interprets `batch_size` (the retrain
/// trigger); the rest exist for pluggable trained models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub model_kind: ModelKind,
    pub feature_extraction: FeatureExtractionKind,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 10,
            batch_size: 32,
            model_kind: ModelKind::Unsupervised,
            feature_extraction: FeatureExtractionKind::Wavelet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.window_size, 1024);
        assert!((config.sample_rate_hz() - 2.4e6).abs() < 1e-6);
        assert!((config.span_mhz() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_match_known_signal_picks_nearest() {
        let config = DetectionConfig {
            known_signals: vec![
                KnownSignalProfile {
                    name: "WiFi ch1".into(),
                    frequency_mhz: 2412.0,
                    modulation: None,
                    threat: ThreatLevel::None,
                },
                KnownSignalProfile {
                    name: "Drone link".into(),
                    frequency_mhz: 2412.8,
                    modulation: Some(Modulation::Fsk),
                    threat: ThreatLevel::High,
                },
            ],
            ..Default::default()
        };

        assert_eq!(
            config.match_known_signal(2412.6).map(|p| p.name.as_str()),
            Some("Drone link")
        );
        assert!(config.match_known_signal(2450.0).is_none());
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = DetectionConfig {
            known_signals: vec![KnownSignalProfile {
                name: "WiFi ch1".into(),
                frequency_mhz: 2412.0,
                modulation: Some(Modulation::Fsk),
                threat: ThreatLevel::Low,
            }],
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: DetectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
