//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod consensus_logger;
pub mod llm_gateway;
pub mod progress;
