//! Pattern Classification
//!
//! Matches a feature vector against a library of named known-pattern
//! feature sets, falling back to rule-based heuristics when nothing in the
//! library is close enough.

use tracing::info;

use crate::types::{Modulation, SignalFeatures};

/// Similarity above which a library pattern is considered a match
const MATCH_THRESHOLD: f64 = 0.7;

/// Library of learned patterns plus the heuristic fallback ladder
///
/// Patterns are checked in insertion order and the first match wins, so the
/// library behaves like an ordered map keyed by pattern name.
#[derive(Debug, Default)]
pub struct PatternClassifier {
    patterns: Vec<(String, Vec<SignalFeatures>)>,
}

impl PatternClassifier {
    /// Create an empty classifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name to a set of reference feature vectors
    ///
    /// Idempotent overwrite: learning an existing name replaces its
    /// references in place without changing its position in match order.
    pub fn learn_pattern(&mut self, name: impl Into<String>, references: Vec<SignalFeatures>) {
        let name = name.into();
        info!(pattern = %name, references = references.len(), "learned pattern");

        if let Some(entry) = self.patterns.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = references;
        } else {
            self.patterns.push((name, references));
        }
    }

    /// Number of learned patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Classify a feature vector
    ///
    /// Returns the first library pattern whose similarity exceeds the match
    /// threshold, otherwise the first fallback heuristic that applies.
    /// Returns `None` only for an empty spectral density (nothing was
    /// analyzed).
    pub fn classify(&self, features: &SignalFeatures) -> Option<String> {
        for (name, references) in &self.patterns {
            if references
                .iter()
                .any(|r| similarity(features, r) > MATCH_THRESHOLD)
            {
                return Some(name.clone());
            }
        }

        if features.spectral_density.is_empty() {
            return None;
        }
        Some(fallback_classification(features).to_string())
    }
}

/// Weighted similarity between a feature vector and one reference
///
/// Four equally weighted terms: SNR within 3 dB, bandwidth within 20 % of
/// the reference, exact modulation match, time variance within 0.1.
fn similarity(features: &SignalFeatures, reference: &SignalFeatures) -> f64 {
    let mut score = 0.0;

    if (features.snr_db - reference.snr_db).abs() < 3.0 {
        score += 0.25;
    }
    if (features.bandwidth_mhz - reference.bandwidth_mhz).abs()
        < reference.bandwidth_mhz * 0.2
    {
        score += 0.25;
    }
    if features.modulation == reference.modulation {
        score += 0.25;
    }
    if (features.time_variance - reference.time_variance).abs() < 0.1 {
        score += 0.25;
    }

    score
}

/// Fixed-priority heuristic ladder for unmatched signals
fn fallback_classification(features: &SignalFeatures) -> &'static str {
    let highest_peak_mhz = features
        .peak_frequencies_mhz
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    if features.time_variance > 0.8 && features.bandwidth_mhz < 10.0 {
        "Potential Drone Control"
    } else if features.snr_db > 15.0 && features.bandwidth_mhz < 5.0 {
        "Narrowband Transmission"
    } else if features.modulation == Modulation::Fsk && features.bandwidth_mhz > 50.0 {
        "Frequency Hopping Communication"
    } else if highest_peak_mhz > 900.0 && highest_peak_mhz < 930.0 {
        "GSM Communication"
    } else if features.time_variance < 0.2 && features.snr_db > 20.0 {
        "Continuous Wave Signal"
    } else {
        "Unknown Signal Type"
    }
}
