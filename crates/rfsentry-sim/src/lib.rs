//! # rfsentry-sim
//!
//! Capture collaborators for the rfsentry pipeline. The core never touches
//! hardware or blocks on I/O; implementations of [`CaptureSource`] sit on
//! the other side of that seam and hand it materialized sample windows.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Frame loop (CLI)                │
//! └──────────────────────────────────────────────┘
//!          │ capture_window()        │ process_frame()
//!          ▼                         ▼
//! ┌──────────────────┐      ┌──────────────────┐
//! │  CaptureSource   │      │  rfsentry-core   │
//! │  (simulator,     │─────►│  Pipeline        │
//! │   hardware, ...) │      │                  │
//! └──────────────────┘      └──────────────────┘
//! ```
//!
//! The only implementation shipped here is [`RfSimulator`], a seedable
//! software RF environment for demos and tests.

pub mod simulator;
pub mod source;

pub use simulator::RfSimulator;
pub use source::{CaptureError, CaptureResult, CaptureSource};
