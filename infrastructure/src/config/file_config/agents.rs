//! Per-task agent overrides from TOML (`[agents.<task>]` tables)

use serde::{Deserialize, Serialize};

/// Overrides for one task; unset fields inherit from `[models]`.
///
/// # Example
///
/// ```toml
/// [agents.recipe_generation]
/// confidence_threshold = 0.7
/// models = ["claude-sonnet-4.5", "gpt-4o"]
///
/// [agents.coaching]
/// fallback = "deterministic"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentOverride {
    pub confidence_threshold: Option<f64>,
    pub models: Option<Vec<String>>,
    pub fallback: Option<String>,
}
