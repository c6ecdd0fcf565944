//! Application layer for nutri-quorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AgentConfigs, ConsensusSettings};
pub use ports::{
    consensus_logger::{ConsensusEvent, ConsensusLogger, NoConsensusLogger},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::agent_runner::{AgentError, AgentRunner};
pub use use_cases::process_task::{
    ProcessTaskError, ProcessTaskInput, ProcessTaskUseCase, TaskOutcome,
};
