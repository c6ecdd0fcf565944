//! Multi-model consensus.
//!
//! Several agent responses for the same task are reconciled into one
//! result plus diagnostics:
//!
//! ```text
//! responses ──► confidence filter ──► merge strategy (per task type)
//!                      │                      │
//!                      ▼                      ▼
//!              agreement score ──► global confidence ──► ConsensusResult
//! ```
//!
//! Everything in this module is synchronous and side-effect free apart from
//! one `tracing` event per validation.

pub mod merge;
pub mod result;
pub mod stats;
pub mod strategy;
pub mod validator;

pub use merge::{MergeOutcome, NUMERIC_FIELDS};
pub use result::ConsensusResult;
pub use strategy::MergeStrategy;
pub use validator::{ConsensusValidator, DEFAULT_MIN_AGREEMENT, DEFAULT_MIN_CONFIDENCE};
