//! Port for structured consensus logging.
//!
//! Defines the [`ConsensusLogger`] trait for recording agent responses and
//! consensus outcomes to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures every
//! processed task in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured consensus event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The adapter adds the timestamp.
#[derive(Debug, Clone)]
pub struct ConsensusEvent {
    /// Event type identifier ("agent_response", "consensus_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConsensusEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging consensus events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// The `log` method is synchronous and non-fallible: a failed write must not
/// fail the task that produced the event.
pub trait ConsensusLogger: Send + Sync {
    /// Record a consensus event.
    fn log(&self, event: ConsensusEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConsensusLogger;

impl ConsensusLogger for NoConsensusLogger {
    fn log(&self, _event: ConsensusEvent) {}
}
