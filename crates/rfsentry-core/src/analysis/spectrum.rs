//! Spectral Transform
//!
//! Converts one real-valued sample window into a frequency/magnitude frame.

use crate::fft_utils::FftProcessor;
use crate::types::{PipelineError, PipelineResult, SampleWindow};

/// Frequency/magnitude representation of one sample window
///
/// Bins are strictly ascending and equally spaced at `freq_resolution_hz`;
/// bin `i` sits at `i * sample_rate / fft_size`. The frame lives for one
/// pipeline pass and is not retained.
#[derive(Debug, Clone)]
pub struct SpectralFrame {
    /// Frequency bins in Hz, ascending
    pub frequencies_hz: Vec<f64>,
    /// Non-negative magnitude per bin
    pub magnitudes: Vec<f64>,
    /// Frequency step between bins in Hz
    pub freq_resolution_hz: f64,
}

impl SpectralFrame {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// True if the frame holds no bins
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Largest magnitude in the frame, 0.0 when empty
    pub fn max_magnitude(&self) -> f64 {
        self.magnitudes.iter().cloned().fold(0.0, f64::max)
    }

    /// Index of the bin nearest the given frequency, clamped to the frame
    pub fn nearest_bin(&self, freq_hz: f64) -> usize {
        if self.freq_resolution_hz <= 0.0 {
            return 0;
        }
        let idx = (freq_hz / self.freq_resolution_hz).round();
        (idx.max(0.0) as usize).min(self.magnitudes.len().saturating_sub(1))
    }
}

/// FFT-based spectral transform with a fixed window size
pub struct SpectrumAnalyzer {
    fft_size: usize,
    processor: FftProcessor,
}

impl SpectrumAnalyzer {
    /// Create an analyzer for windows of the given size
    pub fn new(fft_size: usize) -> Self {
        Self {
            fft_size,
            processor: FftProcessor::new(fft_size),
        }
    }

    /// Get the window size this analyzer expects
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Transform a window into an N/2-bin spectral frame
    ///
    /// Deterministic for identical input. Fails with `InvalidWindow` when
    /// the window is too short, the wrong size, or contains non-finite
    /// samples.
    pub fn compute(&mut self, window: &SampleWindow) -> PipelineResult<SpectralFrame> {
        let n = window.len();
        if n <= 1 {
            return Err(PipelineError::InvalidWindow(format!(
                "window of {} samples is too short to transform",
                n
            )));
        }
        if n != self.fft_size {
            return Err(PipelineError::InvalidWindow(format!(
                "window holds {} samples, analyzer expects {}",
                n, self.fft_size
            )));
        }
        if let Some(pos) = window.samples.iter().position(|s| !s.is_finite()) {
            return Err(PipelineError::InvalidWindow(format!(
                "non-finite sample at index {}",
                pos
            )));
        }

        let magnitudes = self.processor.real_magnitudes(&window.samples);
        let freq_resolution_hz = window.sample_rate_hz / n as f64;
        let frequencies_hz: Vec<f64> = (0..magnitudes.len())
            .map(|i| i as f64 * freq_resolution_hz)
            .collect();

        Ok(SpectralFrame {
            frequencies_hz,
            magnitudes,
            freq_resolution_hz,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone_window(size: usize, sample_rate: f64, freq: f64, amplitude: f64) -> SampleWindow {
        let samples: Vec<f64> = (0..size)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect();
        SampleWindow::new(samples, sample_rate)
    }

    #[test]
    fn test_frame_shape() {
        let mut analyzer = SpectrumAnalyzer::new(1024);
        let window = tone_window(1024, 2.4e6, 100e3, 0.8);
        let frame = analyzer.compute(&window).unwrap();

        assert_eq!(frame.len(), 512);
        assert!(frame.magnitudes.iter().all(|&m| m >= 0.0));

        // Strictly ascending, constant step of R/N
        let step = 2.4e6 / 1024.0;
        for (i, pair) in frame.frequencies_hz.windows(2).enumerate() {
            assert!(pair[1] > pair[0]);
            assert!(
                (pair[1] - pair[0] - step).abs() < 1e-9,
                "non-uniform step between bins {} and {}",
                i,
                i + 1
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let mut analyzer = SpectrumAnalyzer::new(512);
        let window = tone_window(512, 1e6, 50e3, 0.5);
        let a = analyzer.compute(&window).unwrap();
        let b = analyzer.compute(&window).unwrap();
        assert_eq!(a.magnitudes, b.magnitudes);
    }

    #[test]
    fn test_rejects_short_window() {
        let mut analyzer = SpectrumAnalyzer::new(1024);
        let err = analyzer
            .compute(&SampleWindow::new(vec![1.0], 2.4e6))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWindow(_)));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut analyzer = SpectrumAnalyzer::new(4);
        let err = analyzer
            .compute(&SampleWindow::new(vec![0.0, f64::NAN, 0.0, 0.0], 2.4e6))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWindow(_)));
    }

    #[test]
    fn test_nearest_bin_clamps() {
        let mut analyzer = SpectrumAnalyzer::new(256);
        let window = tone_window(256, 1e6, 100e3, 1.0);
        let frame = analyzer.compute(&window).unwrap();

        assert_eq!(frame.nearest_bin(-5.0), 0);
        assert_eq!(frame.nearest_bin(1e9), frame.len() - 1);
    }
}
