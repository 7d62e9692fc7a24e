//! Anomaly History
//!
//! Consumer-facing rolling store of emitted anomaly events: deduplicated by
//! id, newest first, capped so a long session cannot grow without bound.
//! Also used verbatim for results pre-shaped by a remote analyzer, where the
//! core's role degrades to pass-through plus deduplication.

use crate::types::AnomalyEvent;

/// Default retention cap
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Dedup-by-id event store with a rolling cap, newest first
#[derive(Debug, Clone)]
pub struct AnomalyHistory {
    cap: usize,
    events: Vec<AnomalyEvent>,
}

impl Default for AnomalyHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl AnomalyHistory {
    /// Create a history retaining at most `cap` events
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            events: Vec::new(),
        }
    }

    /// Record an event unless its id was already seen
    ///
    /// Returns true when the event was added. The oldest entry falls off
    /// once the cap is reached.
    pub fn push(&mut self, event: AnomalyEvent) -> bool {
        if self.events.iter().any(|e| e.id == event.id) {
            return false;
        }
        self.events.insert(0, event);
        self.events.truncate(self.cap);
        true
    }

    /// Retained events, newest first
    pub fn events(&self) -> &[AnomalyEvent] {
        &self.events
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is retained
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
