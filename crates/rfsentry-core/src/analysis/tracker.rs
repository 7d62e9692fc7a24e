//! Active Signal Tracking
//!
//! Maintains the set of currently live detections inside a trailing horizon
//! and derives the running statistics shown per frame.

use crate::types::Detection;

/// Default horizon after which a detection ages out
pub const DEFAULT_HORIZON_MS: u64 = 10_000;

/// Width of one occupancy bin for the bandwidth statistic
const BANDWIDTH_BIN_MHZ: f64 = 10.0;

/// Running statistics over the detection stream
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalStatistics {
    /// Total detections observed, monotonically increasing
    pub signals_processed: u64,
    /// Total detections that carried the anomaly flag
    pub potential_threats: u64,
    /// Occupied bandwidth of the latest frame in MHz
    pub bandwidth_mhz: f64,
}

/// Time-ordered set of live detections with append-and-prune maintenance
#[derive(Debug)]
pub struct ActiveSignalTracker {
    horizon_ms: u64,
    signals: Vec<Detection>,
    stats: SignalStatistics,
}

impl Default for ActiveSignalTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON_MS)
    }
}

impl ActiveSignalTracker {
    /// Create a tracker with the given aging horizon
    pub fn new(horizon_ms: u64) -> Self {
        Self {
            horizon_ms,
            signals: Vec::new(),
            stats: SignalStatistics::default(),
        }
    }

    /// Prune aged-out detections, append this frame's new ones, and update
    /// the statistics
    pub fn observe(&mut self, new_detections: &[Detection], now_ms: u64) {
        self.signals
            .retain(|d| now_ms.saturating_sub(d.timestamp_ms) < self.horizon_ms);
        self.signals.extend_from_slice(new_detections);

        self.stats.signals_processed += new_detections.len() as u64;
        self.stats.potential_threats +=
            new_detections.iter().filter(|d| d.is_anomaly).count() as u64;
        self.stats.bandwidth_mhz = occupied_bandwidth_mhz(new_detections);
    }

    /// The currently live detections
    pub fn active(&self) -> &[Detection] {
        &self.signals
    }

    /// Snapshot of the running statistics
    pub fn statistics(&self) -> SignalStatistics {
        self.stats
    }
}

/// Number of distinct occupied 10 MHz bins times 10
fn occupied_bandwidth_mhz(detections: &[Detection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let mut bins: Vec<i64> = detections
        .iter()
        .map(|d| (d.frequency_mhz / BANDWIDTH_BIN_MHZ).floor() as i64)
        .collect();
    bins.sort_unstable();
    bins.dedup();
    bins.len() as f64 * BANDWIDTH_BIN_MHZ
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(frequency_mhz: f64, timestamp_ms: u64, is_anomaly: bool) -> Detection {
        Detection {
            frequency_mhz,
            amplitude: 0.5,
            confidence: 1.0,
            timestamp_ms,
            is_anomaly,
        }
    }

    #[test]
    fn test_pruning_at_horizon() {
        let mut tracker = ActiveSignalTracker::new(10_000);
        let now = 11_000;

        tracker.observe(&[detection(2450.0, 0, false)], 0);
        tracker.observe(&[detection(2451.0, 5_000, false)], 5_000);
        tracker.observe(&[detection(2452.0, 11_000, false)], now);

        // t=0 aged out; t=5s and t=11s survive
        let live: Vec<u64> = tracker.active().iter().map(|d| d.timestamp_ms).collect();
        assert_eq!(live, vec![5_000, 11_000]);
    }

    #[test]
    fn test_signals_processed_is_monotonic() {
        let mut tracker = ActiveSignalTracker::default();
        tracker.observe(&[detection(2450.0, 0, false); 3], 0);
        tracker.observe(&[], 100);
        tracker.observe(&[detection(2450.0, 200, false); 2], 200);

        assert_eq!(tracker.statistics().signals_processed, 5);
    }

    #[test]
    fn test_threat_count_follows_anomaly_flag() {
        let mut tracker = ActiveSignalTracker::default();
        tracker.observe(
            &[
                detection(2450.0, 0, true),
                detection(2460.0, 0, false),
                detection(2470.0, 0, true),
            ],
            0,
        );

        assert_eq!(tracker.statistics().potential_threats, 2);
    }

    #[test]
    fn test_occupied_bandwidth() {
        // 2450 and 2455 share a 10 MHz bin; 2470 occupies a second one
        let detections = [
            detection(2450.0, 0, false),
            detection(2455.0, 0, false),
            detection(2470.0, 0, false),
        ];
        assert!((occupied_bandwidth_mhz(&detections) - 20.0).abs() < 1e-9);
        assert_eq!(occupied_bandwidth_mhz(&[]), 0.0);
    }
}
