//! Per-agent model and threshold configuration.
//!
//! [`AgentConfig`] is read-only once an agent is built. It is passed in at
//! construction time rather than looked up from global state.

use super::task_type::TaskType;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Default confidence below which an agent drops to its fallback.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Upper bound on concurrent model calls for a single fan-out.
pub const MAX_FAN_OUT: usize = 3;

/// Model selection and fallback settings for one agent.
///
/// # Example
///
/// ```
/// use nutri_domain::{AgentConfig, Model};
///
/// let config = AgentConfig::default()
///     .with_primary_models(vec![Model::ClaudeSonnet45])
///     .with_fallback_model(None);
///
/// assert_eq!(config.select_model(None), Some(Model::ClaudeSonnet45));
/// assert!(config.fallback_model.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Models tried first, in preference order.
    pub primary_models: Vec<Model>,
    /// Model used when the primary answer is not confident enough.
    /// `None` means the deterministic fallback is used instead.
    pub fallback_model: Option<Model>,
    /// Minimum confidence for a model answer to be kept.
    pub confidence_threshold: f64,
    /// Maximum number of models queried concurrently, within `1..=MAX_FAN_OUT`.
    pub max_fan_out: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            primary_models: Model::default_models(),
            fallback_model: Some(Model::default_fallback()),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_fan_out: MAX_FAN_OUT,
        }
    }
}

impl AgentConfig {
    /// Default configuration for a task, using vision models where needed
    pub fn for_task(task: TaskType) -> Self {
        if task.requires_vision() {
            Self::default()
                .with_primary_models(Model::default_vision_models())
                .with_fallback_model(None)
        } else {
            Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_primary_models(mut self, models: Vec<Model>) -> Self {
        self.primary_models = models;
        self
    }

    pub fn with_fallback_model(mut self, model: Option<Model>) -> Self {
        self.fallback_model = model;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Clamped to `1..=MAX_FAN_OUT`.
    pub fn with_max_fan_out(mut self, max: usize) -> Self {
        self.max_fan_out = max.clamp(1, MAX_FAN_OUT);
        self
    }

    // ==================== Selection ====================

    /// Pick the model for a single call.
    ///
    /// Explicit model first, then the first primary model, then the
    /// fallback model. `None` when nothing is configured.
    pub fn select_model(&self, explicit: Option<&Model>) -> Option<Model> {
        explicit
            .or_else(|| self.primary_models.first())
            .or(self.fallback_model.as_ref())
            .cloned()
    }

    /// Whether `model` is this agent's configured fallback model
    pub fn is_fallback_model(&self, model: &Model) -> bool {
        self.fallback_model.as_ref() == Some(model)
    }

    /// Models for a fan-out: the requested list (or the primary list),
    /// deduplicated and capped at `max_fan_out`.
    pub fn fan_out_models(&self, requested: Option<&[Model]>) -> Vec<Model> {
        let source = requested.unwrap_or(&self.primary_models);
        let cap = self.max_fan_out.min(MAX_FAN_OUT);
        let mut models: Vec<Model> = Vec::with_capacity(cap);
        for model in source {
            if models.len() >= cap {
                break;
            }
            if !models.contains(model) {
                models.push(model.clone());
            }
        }
        models
    }
}
