//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ConsensusSettings`]: consensus level, thresholds, outlier policy, outer timeout
//! - [`AgentConfigs`]: one agent configuration per task type

pub mod agent_configs;
pub mod consensus_settings;

pub use agent_configs::AgentConfigs;
pub use consensus_settings::ConsensusSettings;
