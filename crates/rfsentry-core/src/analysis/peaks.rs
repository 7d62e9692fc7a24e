//! Spectral Peak Detection
//!
//! Scan a spectral frame for local maxima above a magnitude floor.

use crate::analysis::spectrum::SpectralFrame;

/// A detected spectral peak
#[derive(Debug, Clone, Copy)]
pub struct SpectralPeak {
    /// Bin index in the frame
    pub bin_index: usize,
    /// Frequency in Hz
    pub frequency_hz: f64,
    /// Magnitude at the peak bin
    pub magnitude: f64,
    /// How much the peak stands out from its neighbors, in [0, 1]
    pub confidence: f64,
}

/// Peak detector over an absolute magnitude floor
///
/// The floor is an absolute magnitude, not a normalized sensitivity; callers
/// holding a [0, 1] sensitivity pre-scale it with
/// [`PeakFinder::threshold_for_sensitivity`].
#[derive(Debug, Clone, Copy)]
pub struct PeakFinder {
    threshold: f64,
}

impl Default for PeakFinder {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

impl PeakFinder {
    /// Create a peak finder with the default floor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute magnitude floor
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Get the current magnitude floor
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scale a normalized [0, 1] sensitivity to a magnitude floor for the
    /// given frame (sensitivity times the frame's maximum magnitude)
    pub fn threshold_for_sensitivity(frame: &SpectralFrame, sensitivity: f64) -> f64 {
        sensitivity.clamp(0.0, 1.0) * frame.max_magnitude()
    }

    /// Find all interior local maxima above the floor, in ascending bin order
    ///
    /// Endpoint bins are never returned. An empty result is valid output,
    /// not an error.
    pub fn find_peaks(&self, frame: &SpectralFrame) -> Vec<SpectralPeak> {
        let magnitudes = &frame.magnitudes;
        let n = magnitudes.len();
        if n < 3 {
            return Vec::new();
        }

        let mut peaks = Vec::new();
        for i in 1..n - 1 {
            let m = magnitudes[i];
            if m > magnitudes[i - 1] && m > magnitudes[i + 1] && m > self.threshold {
                let local_noise = (magnitudes[i - 1] + magnitudes[i + 1]) / 2.0;
                let confidence = if local_noise > 0.0 {
                    ((m - local_noise) / local_noise).clamp(0.0, 1.0)
                } else if m > 0.0 {
                    // Peak rising straight out of silence
                    1.0
                } else {
                    continue;
                };

                peaks.push(SpectralPeak {
                    bin_index: i,
                    frequency_hz: frame.frequencies_hz[i],
                    magnitude: m,
                    confidence,
                });
            }
        }

        peaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from(magnitudes: Vec<f64>) -> SpectralFrame {
        let frequencies_hz: Vec<f64> = (0..magnitudes.len()).map(|i| i as f64 * 100.0).collect();
        SpectralFrame {
            frequencies_hz,
            magnitudes,
            freq_resolution_hz: 100.0,
        }
    }

    #[test]
    fn test_single_peak() {
        let frame = frame_from(vec![0.1, 0.2, 0.9, 0.2, 0.1]);
        let peaks = PeakFinder::new().with_threshold(0.3).find_peaks(&frame);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].bin_index, 2);
        assert!((peaks[0].frequency_hz - 200.0).abs() < 1e-9);
        // local noise = 0.2, (0.9 - 0.2) / 0.2 clamps to 1
        assert!((peaks[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_endpoints_excluded() {
        // Largest values sit at the edges; neither may be reported
        let frame = frame_from(vec![5.0, 0.1, 0.5, 0.1, 5.0]);
        let peaks = PeakFinder::new().with_threshold(0.0).find_peaks(&frame);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].bin_index, 2);
    }

    #[test]
    fn test_confidence_bounds() {
        let frame = frame_from(vec![0.01, 0.02, 0.8, 0.03, 0.2, 0.25, 0.22, 0.01]);
        let peaks = PeakFinder::new().with_threshold(0.0).find_peaks(&frame);

        assert!(!peaks.is_empty());
        for peak in &peaks {
            assert!(peak.confidence >= 0.0 && peak.confidence <= 1.0);
        }
    }

    #[test]
    fn test_zero_noise_neighbors() {
        let frame = frame_from(vec![0.0, 0.0, 0.7, 0.0, 0.0]);
        let peaks = PeakFinder::new().with_threshold(0.1).find_peaks(&frame);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].confidence, 1.0);
    }

    #[test]
    fn test_flat_spectrum_has_no_peaks() {
        let frame = frame_from(vec![0.5; 64]);
        let peaks = PeakFinder::new().with_threshold(0.1).find_peaks(&frame);
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_ascending_bin_order() {
        let frame = frame_from(vec![0.0, 0.4, 0.1, 0.9, 0.1, 0.6, 0.0]);
        let peaks = PeakFinder::new().with_threshold(0.05).find_peaks(&frame);

        assert_eq!(peaks.len(), 3);
        assert!(peaks.windows(2).all(|p| p[0].bin_index < p[1].bin_index));
    }

    #[test]
    fn test_sensitivity_scaling() {
        let frame = frame_from(vec![0.1, 0.2, 2.0, 0.2, 0.1]);
        let floor = PeakFinder::threshold_for_sensitivity(&frame, 0.5);
        assert!((floor - 1.0).abs() < 1e-9);

        // Floor above every interior value but the peak
        let peaks = PeakFinder::new().with_threshold(floor).find_peaks(&frame);
        assert_eq!(peaks.len(), 1);
    }
}
