//! RF Environment Simulator
//!
//! Pure-software capture source for testing and demos without hardware.
//! Each window carries Gaussian background noise plus a handful of
//! synthetic emitters inside the observable slice of the configured band:
//! a continuous tone, a pulsed tone, a five-slot frequency hopper, and an
//! occasional covert impulse burst.
//!
//! Emitter frequencies are redrawn every window, so consecutive frames see
//! a busy, shifting band the way a live scan would.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use tracing::debug;

use rfsentry_core::config::DetectionConfig;
use rfsentry_core::types::SampleWindow;

use crate::source::{CaptureError, CaptureResult, CaptureSource};

/// Pulse gate rate for the pulsed emitter, in Hz
const PULSE_RATE_HZ: f64 = 10_000.0;
/// Slot switch rate for the frequency hopper, in Hz
const HOP_RATE_HZ: f64 = 20_000.0;
/// Number of hopper slots
const HOP_SLOTS: usize = 5;
/// Per-sample probability of a covert impulse
const COVERT_BURST_PROBABILITY: f64 = 0.01;

/// Seedable software capture source
pub struct RfSimulator {
    config: DetectionConfig,
    rng: StdRng,
    noise: Normal<f64>,
    /// Probability that a capture fails with `Unavailable`
    dropout: f64,
}

impl RfSimulator {
    /// Create a simulator seeded from system entropy
    pub fn new(config: DetectionConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create a simulator with a fixed seed for reproducible captures
    pub fn with_seed(config: DetectionConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            noise: Normal::new(0.0, 0.05).expect("valid noise sigma"),
            dropout: 0.0,
        }
    }

    /// Make a fraction of captures fail, to exercise the skip path
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout.clamp(0.0, 1.0);
        self
    }

    /// Swap in a new configuration snapshot
    pub fn update_config(&mut self, config: DetectionConfig) {
        self.config = config;
    }

    /// Width of the band slice the capture can actually represent, in Hz
    fn observable_span_hz(&self) -> f64 {
        let nyquist_hz = self.config.sample_rate_hz() / 2.0;
        (self.config.span_mhz() * 1e6).min(nyquist_hz)
    }

    /// Draw a baseband emitter offset inside the observable slice
    fn random_offset_hz(&mut self) -> f64 {
        self.rng.gen::<f64>() * self.observable_span_hz()
    }

    fn synthesize(&mut self) -> SampleWindow {
        let n = self.config.window_size;
        let sample_rate = self.config.sample_rate_hz();
        let span_hz = self.observable_span_hz();

        // Redrawn per window, like a shifting live band
        let tone_freq = self.random_offset_hz();
        let tone_amp = 0.5 + self.rng.gen::<f64>() * 0.5;

        let pulse_freq = self.random_offset_hz();
        let pulse_amp = 0.3 + self.rng.gen::<f64>() * 0.7;

        let hop_base = self.random_offset_hz();
        let hop_amp = 0.4 + self.rng.gen::<f64>() * 0.2;
        let hop_spacing = span_hz / HOP_SLOTS as f64;

        let mut samples = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f64 / sample_rate;
            let mut s = self.noise.sample(&mut self.rng);

            // Continuous tone
            s += tone_amp * (2.0 * PI * tone_freq * t).sin();

            // Pulsed tone, square gate
            if (2.0 * PI * PULSE_RATE_HZ * t).sin() > 0.0 {
                s += pulse_amp * (2.0 * PI * pulse_freq * t).sin();
            }

            // Frequency hopper, wrapping back into the observable slice
            let slot = (t * HOP_RATE_HZ) as usize % HOP_SLOTS;
            let hop_freq = (hop_base + slot as f64 * hop_spacing) % span_hz.max(1.0);
            s += hop_amp * (2.0 * PI * hop_freq * t).sin();

            // Rare covert impulse
            if self.rng.gen::<f64>() < COVERT_BURST_PROBABILITY {
                s += 0.2 + self.rng.gen::<f64>() * 0.3;
            }

            samples.push(s);
        }

        debug!(
            tone_mhz = self.config.base_frequency_mhz() + tone_freq / 1e6,
            pulse_mhz = self.config.base_frequency_mhz() + pulse_freq / 1e6,
            "synthesized capture window"
        );

        SampleWindow::new(samples, sample_rate)
    }
}

impl CaptureSource for RfSimulator {
    fn capture_window(&mut self) -> CaptureResult<SampleWindow> {
        if self.dropout > 0.0 && self.rng.gen::<f64>() < self.dropout {
            return Err(CaptureError::Unavailable(
                "simulated capture dropout".to_string(),
            ));
        }
        Ok(self.synthesize())
    }

    fn sample_rate_hz(&self) -> f64 {
        self.config.sample_rate_hz()
    }

    fn window_size(&self) -> usize {
        self.config.window_size
    }
}
