//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly, validated once, and then converted into
//! the application-layer [`ConsensusSettings`] and [`AgentConfigs`].

mod agents;
mod consensus;
mod logging;
mod models;
mod provider;

pub use agents::FileAgentOverride;
pub use consensus::FileConsensusConfig;
pub use logging::FileLoggingConfig;
pub use models::FileModelsConfig;
pub use provider::FileProviderConfig;

use nutri_application::{AgentConfigs, ConsensusSettings};
use nutri_domain::agent::config::MAX_FAN_OUT;
use nutri_domain::{AgentConfig, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field} cannot be 0")]
    InvalidTimeout { field: String },

    #[error("{field}: model name cannot be empty")]
    EmptyModelName { field: String },

    #[error("{field} must be within [0.0, 1.0], got {value}")]
    ThresholdOutOfRange { field: String, value: f64 },

    #[error("consensus.min_agreement must be at least 1")]
    ZeroMinAgreement,

    #[error("consensus.max_fan_out must be within [1, {max}], got {value}")]
    FanOutOutOfRange { value: usize, max: usize },

    #[error("agents.{0}: unknown task type")]
    UnknownTask(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model lists shared by all agents
    pub models: FileModelsConfig,
    /// Consensus level and thresholds
    pub consensus: FileConsensusConfig,
    /// Per-task overrides keyed by task tag
    pub agents: BTreeMap<String, FileAgentOverride>,
    /// Inference endpoint
    pub provider: FileProviderConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

fn check_unit_range(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigValidationError::ThresholdOutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.models.primary_models()?;
        self.models.vision_models()?;
        self.models.fallback_model()?;

        check_unit_range("consensus.min_confidence", self.consensus.min_confidence)?;
        if self.consensus.min_agreement == 0 {
            return Err(ConfigValidationError::ZeroMinAgreement);
        }
        if !(1..=MAX_FAN_OUT).contains(&self.consensus.max_fan_out) {
            return Err(ConfigValidationError::FanOutOutOfRange {
                value: self.consensus.max_fan_out,
                max: MAX_FAN_OUT,
            });
        }
        if let Some(0) = self.consensus.task_timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout {
                field: "consensus.task_timeout_seconds".to_string(),
            });
        }
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout {
                field: "provider.timeout_seconds".to_string(),
            });
        }

        for (tag, agent) in &self.agents {
            tag.parse::<TaskType>()
                .map_err(|_| ConfigValidationError::UnknownTask(tag.clone()))?;
            if let Some(threshold) = agent.confidence_threshold {
                check_unit_range(&format!("agents.{}.confidence_threshold", tag), threshold)?;
            }
            if let Some(models) = &agent.models {
                FileModelsConfig::parse_list(&format!("agents.{}.models", tag), models)?;
            }
            if let Some(fallback) = &agent.fallback {
                FileModelsConfig::parse_fallback(&format!("agents.{}.fallback", tag), fallback)?;
            }
        }

        Ok(())
    }

    /// Application consensus settings
    pub fn consensus_settings(&self) -> ConsensusSettings {
        ConsensusSettings::default()
            .with_level(self.consensus.level)
            .with_min_confidence(self.consensus.min_confidence)
            .with_min_agreement(self.consensus.min_agreement)
            .with_task_timeout(self.consensus.task_timeout_seconds.map(Duration::from_secs))
    }

    /// One agent configuration per task, `[agents.<task>]` applied last
    pub fn agent_configs(&self) -> Result<AgentConfigs, ConfigValidationError> {
        let primary = self.models.primary_models()?;
        let vision = self.models.vision_models()?;
        let fallback = self.models.fallback_model()?;

        let mut configs = AgentConfigs::default();
        for task in TaskType::ALL {
            let mut config = AgentConfig::for_task(task).with_max_fan_out(self.consensus.max_fan_out);
            config = if task.requires_vision() {
                config.with_primary_models(vision.clone())
            } else {
                config
                    .with_primary_models(primary.clone())
                    .with_fallback_model(fallback.clone())
            };

            if let Some(agent) = self.agents.get(task.as_str()) {
                if let Some(threshold) = agent.confidence_threshold {
                    config = config.with_confidence_threshold(threshold);
                }
                if let Some(models) = &agent.models {
                    let field = format!("agents.{}.models", task);
                    config = config.with_primary_models(FileModelsConfig::parse_list(&field, models)?);
                }
                if let Some(name) = &agent.fallback {
                    let field = format!("agents.{}.fallback", task);
                    config = config.with_fallback_model(FileModelsConfig::parse_fallback(&field, name)?);
                }
            }

            *configs.get_mut(task) = config;
        }
        Ok(configs)
    }
}
