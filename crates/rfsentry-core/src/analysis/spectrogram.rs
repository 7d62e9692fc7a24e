//! Spectrogram Aggregation
//!
//! Bucket the active detections into a time-by-frequency intensity grid for
//! a trailing time window. The grid is rebuilt wholesale every aggregation
//! cycle; nothing mutates a previous grid in place.

use crate::types::Detection;

/// Default trailing window covered by the grid
pub const DEFAULT_TIME_WINDOW_MS: u64 = 10_000;
/// Default number of time intervals
pub const DEFAULT_TIME_INTERVALS: usize = 100;
/// Default number of frequency bins
pub const DEFAULT_FREQ_BINS: usize = 100;

/// Time-by-frequency intensity grid built from recent detections
#[derive(Debug, Clone, Default)]
pub struct SpectrogramGrid {
    /// Frequency bin edges in MHz, ascending
    pub frequencies_mhz: Vec<f64>,
    /// Time interval start points in ms since epoch, ascending
    pub time_points_ms: Vec<u64>,
    /// Intensity per cell, indexed `[time][frequency]`, non-negative
    pub intensities: Vec<Vec<f64>>,
}

impl SpectrogramGrid {
    /// Grid dimensions as (time intervals, frequency bins)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.time_points_ms.len(), self.frequencies_mhz.len())
    }

    /// Largest intensity anywhere in the grid
    pub fn peak_intensity(&self) -> f64 {
        self.intensities
            .iter()
            .flat_map(|row| row.iter().cloned())
            .fold(0.0, f64::max)
    }

    /// Render the grid as terminal-width ASCII, newest rows last
    pub fn to_ascii(&self, width: usize, height: usize) -> String {
        let mut output = String::new();
        let (time_bins, freq_bins) = self.dimensions();
        if time_bins == 0 || freq_bins == 0 {
            return output;
        }

        let peak = self.peak_intensity().max(1e-12);
        let chars = [' ', '░', '▒', '▓', '█'];
        let rows_per_char = time_bins.div_ceil(height);
        let cols_per_char = freq_bins.div_ceil(width);

        output.push_str(&"─".repeat(width));
        output.push('\n');

        for row_idx in 0..height {
            let t_start = row_idx * rows_per_char;
            if t_start >= time_bins {
                break;
            }
            let t_end = ((row_idx + 1) * rows_per_char).min(time_bins);

            for col_idx in 0..width {
                let f_start = col_idx * cols_per_char;
                if f_start >= freq_bins {
                    break;
                }
                let f_end = ((col_idx + 1) * cols_per_char).min(freq_bins);

                let mut cell_max = 0.0f64;
                for t in t_start..t_end {
                    for f in f_start..f_end {
                        cell_max = cell_max.max(self.intensities[t][f]);
                    }
                }

                let normalized = (cell_max / peak).clamp(0.0, 1.0);
                let char_idx =
                    ((normalized * (chars.len() - 1) as f64) as usize).min(chars.len() - 1);
                output.push(chars[char_idx]);
            }
            output.push('\n');
        }

        output.push_str(&"─".repeat(width));
        output.push('\n');
        output.push_str(&format!(
            "{:<w$}{:^w$}{:>w$}\n",
            format!("{:.1}", self.frequencies_mhz.first().unwrap_or(&0.0)),
            "MHz",
            format!("{:.1}", self.frequencies_mhz.last().unwrap_or(&0.0)),
            w = width / 3
        ));

        output
    }
}

/// Buckets detections from a trailing time window into a fixed-size grid
#[derive(Debug, Clone)]
pub struct SpectrogramAggregator {
    time_window_ms: u64,
    time_intervals: usize,
    freq_bins: usize,
    freq_range_mhz: (f64, f64),
}

impl SpectrogramAggregator {
    /// Create an aggregator over the given frequency range with default
    /// window and bin counts
    pub fn new(freq_range_mhz: (f64, f64)) -> Self {
        Self {
            time_window_ms: DEFAULT_TIME_WINDOW_MS,
            time_intervals: DEFAULT_TIME_INTERVALS,
            freq_bins: DEFAULT_FREQ_BINS,
            freq_range_mhz,
        }
    }

    /// Override the trailing window length
    pub fn with_time_window_ms(mut self, time_window_ms: u64) -> Self {
        self.time_window_ms = time_window_ms;
        self
    }

    /// Override the grid dimensions
    pub fn with_grid_size(mut self, time_intervals: usize, freq_bins: usize) -> Self {
        self.time_intervals = time_intervals;
        self.freq_bins = freq_bins;
        self
    }

    /// Build a fresh grid from the detections, covering `[now - W, now]`
    ///
    /// Detections outside the time window or frequency range are silently
    /// dropped. Overlapping detections never decrease a cell: each cell
    /// keeps the maximum amplitude that mapped into it.
    pub fn aggregate(&self, detections: &[Detection], now_ms: u64) -> SpectrogramGrid {
        let start_ms = now_ms.saturating_sub(self.time_window_ms);
        let time_step_ms = self.time_window_ms as f64 / self.time_intervals as f64;

        let (min_mhz, max_mhz) = self.freq_range_mhz;
        let freq_step_mhz = (max_mhz - min_mhz) / self.freq_bins as f64;

        let frequencies_mhz: Vec<f64> = (0..self.freq_bins)
            .map(|i| min_mhz + i as f64 * freq_step_mhz)
            .collect();
        let time_points_ms: Vec<u64> = (0..self.time_intervals)
            .map(|i| start_ms + (i as f64 * time_step_ms) as u64)
            .collect();
        let mut intensities = vec![vec![0.0f64; self.freq_bins]; self.time_intervals];

        for detection in detections {
            if detection.timestamp_ms < start_ms || detection.timestamp_ms > now_ms {
                continue;
            }
            let time_index =
                ((detection.timestamp_ms - start_ms) as f64 / time_step_ms) as usize;
            if time_index >= self.time_intervals {
                continue;
            }
            if detection.frequency_mhz < min_mhz || freq_step_mhz <= 0.0 {
                continue;
            }
            let freq_index = ((detection.frequency_mhz - min_mhz) / freq_step_mhz) as usize;
            if freq_index >= self.freq_bins {
                continue;
            }

            let cell = &mut intensities[time_index][freq_index];
            *cell = cell.max(detection.amplitude);
        }

        SpectrogramGrid {
            frequencies_mhz,
            time_points_ms,
            intensities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(frequency_mhz: f64, amplitude: f64, timestamp_ms: u64) -> Detection {
        Detection {
            frequency_mhz,
            amplitude,
            confidence: 1.0,
            timestamp_ms,
            is_anomaly: false,
        }
    }

    #[test]
    fn test_grid_shape() {
        let aggregator = SpectrogramAggregator::new((2400.0, 2500.0));
        let grid = aggregator.aggregate(&[], 20_000);

        assert_eq!(grid.dimensions(), (100, 100));
        assert!(grid.time_points_ms.windows(2).all(|w| w[1] > w[0]));
        assert!(grid
            .frequencies_mhz
            .windows(2)
            .all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_max_wins_on_overlap() {
        let aggregator = SpectrogramAggregator::new((2400.0, 2500.0));
        let now = 20_000;
        let detections = [
            detection(2450.0, 0.3, now - 100),
            detection(2450.0, 0.9, now - 100),
            detection(2450.0, 0.5, now - 100),
        ];
        let grid = aggregator.aggregate(&detections, now);

        assert!((grid.peak_intensity() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_dropped() {
        let aggregator = SpectrogramAggregator::new((2400.0, 2500.0));
        let now = 60_000;
        let detections = [
            detection(2300.0, 0.8, now),      // Below the band
            detection(2600.0, 0.8, now),      // Above the band
            detection(2450.0, 0.8, now - 15_000), // Older than the window
        ];
        let grid = aggregator.aggregate(&detections, now);

        assert_eq!(grid.peak_intensity(), 0.0);
    }

    #[test]
    fn test_detection_maps_to_expected_cell() {
        let aggregator = SpectrogramAggregator::new((2400.0, 2500.0));
        let now = 20_000;
        // Halfway through the window, halfway through the band
        let grid = aggregator.aggregate(&[detection(2450.0, 0.7, now - 5_000)], now);

        assert!((grid.intensities[50][50] - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_ascii_render_is_non_empty() {
        let aggregator = SpectrogramAggregator::new((2400.0, 2500.0));
        let now = 20_000;
        let grid = aggregator.aggregate(&[detection(2420.0, 0.9, now - 1000)], now);
        let art = grid.to_ascii(60, 20);

        assert!(art.contains('█'));
        assert!(art.contains("MHz"));
    }
}
