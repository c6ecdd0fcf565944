//! Infrastructure layer for nutri-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentOverride, FileConfig, FileConsensusConfig,
    FileLoggingConfig, FileModelsConfig, FileProviderConfig,
};
pub use logging::JsonlConsensusLogger;
pub use providers::{GatewayConfig, OpenAiCompatibleGateway, RetryPolicy};
