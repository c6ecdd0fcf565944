//! Model value object representing an inference model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier reported by responses that never reached a model.
pub const DETERMINISTIC_MODEL_ID: &str = "deterministic";

/// Inference models an agent can be backed by (Value Object)
///
/// Known models get their own variant so configuration typos are visible
/// in logs; anything else is carried as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // OpenAI models
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    // Claude models
    ClaudeSonnet45,
    ClaudeHaiku45,
    // Gemini models
    Gemini25Pro,
    Gemini25Flash,
    // Open-weight vision model
    Llama32Vision,
    /// No model call was made (rule-based fallback)
    Deterministic,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::ClaudeSonnet45 => "claude-sonnet-4.5",
            Model::ClaudeHaiku45 => "claude-haiku-4.5",
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Llama32Vision => "llama-3.2-90b-vision",
            Model::Deterministic => DETERMINISTIC_MODEL_ID,
            Model::Custom(s) => s,
        }
    }

    /// Default models for text tasks, in fan-out order
    pub fn default_models() -> Vec<Model> {
        vec![Model::Gpt4o, Model::ClaudeSonnet45, Model::Gemini25Pro]
    }

    /// Default models able to read images
    pub fn default_vision_models() -> Vec<Model> {
        vec![Model::Gpt4o, Model::Gemini25Pro, Model::Llama32Vision]
    }

    /// Default fallback model (cheap, fast)
    pub fn default_fallback() -> Model {
        Model::Gpt4oMini
    }

    /// Check if this is the rule-based pseudo model
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Model::Deterministic)
    }

    /// Check if this model accepts image input
    pub fn supports_vision(&self) -> bool {
        matches!(
            self,
            Model::Gpt4o
                | Model::Gpt41
                | Model::ClaudeSonnet45
                | Model::Gemini25Pro
                | Model::Gemini25Flash
                | Model::Llama32Vision
        )
    }
}

impl Default for Model {
    /// Returns the default model (gpt-4o)
    fn default() -> Self {
        Model::Gpt4o
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "claude-sonnet-4.5" => Model::ClaudeSonnet45,
            "claude-haiku-4.5" => Model::ClaudeHaiku45,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "llama-3.2-90b-vision" => Model::Llama32Vision,
            DETERMINISTIC_MODEL_ID => Model::Deterministic,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        for model in Model::default_models() {
            let parsed: Model = model.to_string().parse().unwrap();
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_custom_model() {
        let model: Model = "mistral-large".parse().unwrap();
        assert_eq!(model, Model::Custom("mistral-large".to_string()));
        assert_eq!(model.to_string(), "mistral-large");
    }

    #[test]
    fn test_deterministic_identifier() {
        assert_eq!(Model::Deterministic.as_str(), "deterministic");
        assert!(Model::from("deterministic").is_deterministic());
        assert!(!Model::Gpt4o.is_deterministic());
    }

    #[test]
    fn test_vision_support() {
        assert!(Model::Llama32Vision.supports_vision());
        assert!(!Model::Gpt4oMini.supports_vision());
        assert!(!Model::Deterministic.supports_vision());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&Model::ClaudeSonnet45).unwrap();
        assert_eq!(json, "\"claude-sonnet-4.5\"");
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Model::ClaudeSonnet45);
    }
}
