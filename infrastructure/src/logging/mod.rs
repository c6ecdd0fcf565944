//! Logging infrastructure: structured consensus logging.
//!
//! Provides [`JsonlConsensusLogger`], a JSONL file writer that implements
//! the [`ConsensusLogger`](nutri_application::ConsensusLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConsensusLogger;
