//! Feature Extraction
//!
//! Derive the fixed feature vector (spectral density, top peak frequencies,
//! SNR, bandwidth estimate, time variance, modulation estimate) for one
//! detection and the sample window it came from.

use crate::analysis::spectrum::{SpectralFrame, SpectrumAnalyzer};
use crate::types::{
    Detection, Modulation, PipelineError, PipelineResult, SampleWindow, SignalFeatures,
};

/// Number of top peak frequencies carried in the feature vector
pub const PEAK_FREQUENCY_COUNT: usize = 5;

/// Bins this close to the detection bin are excluded from the noise estimate
const NOISE_EXCLUSION_BINS: usize = 3;

/// SNR sentinel when the noise estimate vanishes
const SNR_CAP_DB: f64 = 100.0;

/// Spectral flatness floor added before taking logs
const FLATNESS_EPSILON: f64 = 1e-10;

/// Extracts the per-detection feature vector
///
/// Owns its own spectral transform so extraction stays a pure function of
/// the window, independent of whatever frame produced the detection.
pub struct FeatureExtractor {
    analyzer: SpectrumAnalyzer,
    /// Band start in MHz; detection frequencies are absolute, bins are
    /// baseband offsets from here
    base_frequency_mhz: f64,
}

impl FeatureExtractor {
    /// Create an extractor for windows of the given size, downconverted
    /// from `base_frequency_mhz`
    pub fn new(window_size: usize, base_frequency_mhz: f64) -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(window_size),
            base_frequency_mhz,
        }
    }

    /// Compute the feature vector for one detection
    ///
    /// Deterministic and side-effect free. Fails with `EmptyWindow` on a
    /// zero-length window and propagates `InvalidWindow` from the transform.
    pub fn extract(
        &mut self,
        detection: &Detection,
        window: &SampleWindow,
    ) -> PipelineResult<SignalFeatures> {
        if window.is_empty() {
            return Err(PipelineError::EmptyWindow);
        }

        let frame = self.analyzer.compute(window)?;

        let spectral_density: Vec<f64> = frame.magnitudes.iter().map(|&m| m * m).collect();
        let peak_frequencies_mhz = self.top_peak_frequencies(&frame);

        let offset_hz = (detection.frequency_mhz - self.base_frequency_mhz) * 1e6;
        let idx = frame.nearest_bin(offset_hz);

        let snr_db = signal_to_noise_db(&frame, idx);
        let bandwidth_mhz = bandwidth_estimate_hz(&frame, idx) / 1e6;
        let time_variance = population_variance(&window.samples);
        let modulation = estimate_modulation(&frame.magnitudes, &window.samples);

        Ok(SignalFeatures {
            spectral_density,
            peak_frequencies_mhz,
            snr_db,
            bandwidth_mhz,
            time_variance,
            modulation,
        })
    }

    /// Top-K absolute frequencies sorted by descending magnitude
    fn top_peak_frequencies(&self, frame: &SpectralFrame) -> Vec<f64> {
        let mut indices: Vec<usize> = (0..frame.len()).collect();
        indices.sort_by(|&a, &b| {
            frame.magnitudes[b]
                .partial_cmp(&frame.magnitudes[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        indices
            .into_iter()
            .take(PEAK_FREQUENCY_COUNT)
            .map(|i| self.base_frequency_mhz + frame.frequencies_hz[i] / 1e6)
            .collect()
    }
}

/// SNR at `idx` against the mean squared magnitude of all bins more than
/// `NOISE_EXCLUSION_BINS` away, in dB
fn signal_to_noise_db(frame: &SpectralFrame, idx: usize) -> f64 {
    let signal_power = frame.magnitudes[idx] * frame.magnitudes[idx];

    let mut noise_power = 0.0;
    let mut count = 0usize;
    for (i, &m) in frame.magnitudes.iter().enumerate() {
        if i.abs_diff(idx) > NOISE_EXCLUSION_BINS {
            noise_power += m * m;
            count += 1;
        }
    }

    if count == 0 || noise_power <= 0.0 {
        return if signal_power > 0.0 { SNR_CAP_DB } else { 0.0 };
    }
    noise_power /= count as f64;

    if signal_power <= 0.0 {
        return -SNR_CAP_DB;
    }
    (10.0 * (signal_power / noise_power).log10()).clamp(-SNR_CAP_DB, SNR_CAP_DB)
}

/// Width in Hz between the two -3 dB points around `idx`
///
/// Walks outward while magnitude stays at or above peak/sqrt(2), stopping at
/// frame boundaries. Always non-negative and never wider than the frame.
fn bandwidth_estimate_hz(frame: &SpectralFrame, idx: usize) -> f64 {
    let peak = frame.magnitudes[idx];
    if peak <= 0.0 {
        return 0.0;
    }
    let half_power = peak / std::f64::consts::SQRT_2;

    let mut lower = idx;
    while lower > 0 && frame.magnitudes[lower] > half_power {
        lower -= 1;
    }

    let mut upper = idx;
    while upper < frame.len() - 1 && frame.magnitudes[upper] > half_power {
        upper += 1;
    }

    (upper - lower) as f64 * frame.freq_resolution_hz
}

/// Population variance of the raw window
fn population_variance(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n
}

/// Modulation estimate from spectral flatness and zero-crossing density
fn estimate_modulation(magnitudes: &[f64], samples: &[f64]) -> Modulation {
    let flatness = spectral_flatness(magnitudes);

    if flatness > 0.8 {
        Modulation::Fm
    } else if zero_crossings(samples) > samples.len() / 10 {
        Modulation::Fsk
    } else if flatness < 0.2 {
        Modulation::Am
    } else {
        Modulation::Unknown
    }
}

/// Geometric mean over arithmetic mean of the magnitudes
fn spectral_flatness(magnitudes: &[f64]) -> f64 {
    if magnitudes.is_empty() {
        return 1.0;
    }
    let n = magnitudes.len() as f64;
    let log_sum: f64 = magnitudes.iter().map(|&m| (m + FLATNESS_EPSILON).ln()).sum();
    let geometric_mean = (log_sum / n).exp();
    let arithmetic_mean = magnitudes.iter().sum::<f64>() / n;

    if arithmetic_mean <= 0.0 {
        return 1.0;
    }
    geometric_mean / arithmetic_mean
}

/// Count sign changes across the window
fn zero_crossings(samples: &[f64]) -> usize {
    samples
        .windows(2)
        .filter(|pair| (pair[1] >= 0.0) != (pair[0] >= 0.0))
        .count()
}
