//! Anomaly Detection Module
//!
//! Scoring, classification, and the consumer-facing event history. The
//! scoring heuristic and the pattern library both sit behind small seams
//! ([`ScoringModel`], [`PatternClassifier`]) so trained models can replace
//! them without changing the pipeline contract.

pub mod classifier;
pub mod history;
pub mod scorer;

pub use classifier::PatternClassifier;
pub use history::{AnomalyHistory, DEFAULT_HISTORY_CAP};
pub use scorer::{AnomalyDetector, HeuristicModel, ScoringModel, ANOMALY_THRESHOLD};
