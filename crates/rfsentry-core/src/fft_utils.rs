//! FFT utilities for real-valued capture windows
//!
//! The pipeline analyzes real amplitude samples, so only the first N/2 bins
//! of the transform carry information; [`FftProcessor::real_magnitudes`]
//! returns exactly that half-spectrum. Magnitudes are scaled by 2/N so a
//! full-scale sine of amplitude A shows up as a peak of roughly A, which
//! keeps spectrogram intensities comparable with time-domain amplitudes.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

/// FFT processor with a cached plan and scratch buffer for one size
pub struct FftProcessor {
    /// FFT size
    size: usize,
    /// Forward FFT instance
    fft_forward: Arc<dyn Fft<f64>>,
    /// Scratch buffer for in-place transforms
    scratch: Vec<Complex64>,
}

impl fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftProcessor")
            .field("size", &self.size)
            .finish()
    }
}

impl FftProcessor {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft_forward.get_inplace_scratch_len()];

        Self {
            size,
            fft_forward,
            scratch,
        }
    }

    /// Get the FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compute the forward FFT in-place
    pub fn fft_inplace(&mut self, buffer: &mut [Complex64]) {
        assert_eq!(buffer.len(), self.size);
        self.fft_forward
            .process_with_scratch(buffer, &mut self.scratch);
    }

    /// Transform a real-valued window and return the N/2 half-spectrum
    /// magnitudes, scaled by 2/N
    pub fn real_magnitudes(&mut self, samples: &[f64]) -> Vec<f64> {
        let mut buffer: Vec<Complex64> = samples
            .iter()
            .map(|&s| Complex64::new(s, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.fft_inplace(&mut buffer);

        let scale = 2.0 / self.size as f64;
        buffer[..self.size / 2]
            .iter()
            .map(|c| c.norm() * scale)
            .collect()
    }
}
