//! Model configuration from TOML (`[models]` section)

use super::ConfigValidationError;
use nutri_domain::Model;
use serde::{Deserialize, Serialize};

/// Model lists used to build every agent's configuration
///
/// # Example
///
/// ```toml
/// [models]
/// primary  = ["gpt-4o", "claude-sonnet-4.5", "gemini-2.5-pro"]
/// vision   = ["gpt-4o", "gemini-2.5-pro"]   # food_detection
/// fallback = "gpt-4o-mini"                  # or "deterministic"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Fan-out models for text tasks, in preference order
    pub primary: Vec<String>,
    /// Fan-out models for image tasks
    pub vision: Vec<String>,
    /// Model tried when a primary answer is not confident enough.
    /// `"deterministic"` (or `"none"`) means the rule-based result.
    pub fallback: String,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            primary: Model::default_models().iter().map(Model::to_string).collect(),
            vision: Model::default_vision_models()
                .iter()
                .map(Model::to_string)
                .collect(),
            fallback: Model::default_fallback().to_string(),
        }
    }
}

impl FileModelsConfig {
    /// Parse a model list, rejecting empty names.
    pub(crate) fn parse_list(field: &str, names: &[String]) -> Result<Vec<Model>, ConfigValidationError> {
        names
            .iter()
            .map(|name| {
                if name.trim().is_empty() {
                    Err(ConfigValidationError::EmptyModelName {
                        field: field.to_string(),
                    })
                } else {
                    Ok(Model::from(name.trim()))
                }
            })
            .collect()
    }

    /// Parse a fallback name; the rule-based pseudo model maps to `None`.
    pub(crate) fn parse_fallback(
        field: &str,
        name: &str,
    ) -> Result<Option<Model>, ConfigValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigValidationError::EmptyModelName {
                field: field.to_string(),
            });
        }
        let model = Model::from(name);
        if model.is_deterministic() || name.eq_ignore_ascii_case("none") {
            Ok(None)
        } else {
            Ok(Some(model))
        }
    }

    pub fn primary_models(&self) -> Result<Vec<Model>, ConfigValidationError> {
        Self::parse_list("models.primary", &self.primary)
    }

    pub fn vision_models(&self) -> Result<Vec<Model>, ConfigValidationError> {
        Self::parse_list("models.vision", &self.vision)
    }

    pub fn fallback_model(&self) -> Result<Option<Model>, ConfigValidationError> {
        Self::parse_fallback("models.fallback", &self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let models = FileModelsConfig::default();
        assert_eq!(models.primary_models().unwrap(), Model::default_models());
        assert_eq!(models.fallback_model().unwrap(), Some(Model::Gpt4oMini));
    }

    #[test]
    fn test_deterministic_fallback_is_none() {
        let models = FileModelsConfig {
            fallback: "deterministic".to_string(),
            ..Default::default()
        };
        assert_eq!(models.fallback_model().unwrap(), None);
    }

    #[test]
    fn test_empty_name_rejected() {
        let models = FileModelsConfig {
            primary: vec!["gpt-4o".to_string(), " ".to_string()],
            ..Default::default()
        };
        assert_eq!(
            models.primary_models(),
            Err(ConfigValidationError::EmptyModelName {
                field: "models.primary".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_name_is_custom() {
        let models = FileModelsConfig {
            primary: vec!["mistral-large".to_string()],
            ..Default::default()
        };
        assert_eq!(
            models.primary_models().unwrap(),
            vec![Model::Custom("mistral-large".to_string())]
        );
    }
}
