//! The contract each task-specific agent implements.

use super::config::AgentConfig;
use super::task_type::TaskType;
use crate::core::error::DomainError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Image attached to a vision prompt (http(s) URL or `data:` URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub url: String,
}

impl ImageSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// What an agent sends to the generation interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text {
        system: String,
        user: String,
    },
    Vision {
        system: String,
        user: String,
        image: ImageSource,
    },
}

impl Prompt {
    pub fn text(system: impl Into<String>, user: impl Into<String>) -> Self {
        Prompt::Text {
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn vision(system: impl Into<String>, user: impl Into<String>, image: ImageSource) -> Self {
        Prompt::Vision {
            system: system.into(),
            user: user.into(),
            image,
        }
    }

    pub fn system(&self) -> &str {
        match self {
            Prompt::Text { system, .. } | Prompt::Vision { system, .. } => system,
        }
    }

    pub fn user(&self) -> &str {
        match self {
            Prompt::Text { user, .. } | Prompt::Vision { user, .. } => user,
        }
    }

    pub fn image(&self) -> Option<&ImageSource> {
        match self {
            Prompt::Text { .. } => None,
            Prompt::Vision { image, .. } => Some(image),
        }
    }
}

/// Task-specific agent behaviour.
///
/// Implementations supply only the pure pieces: prompt building, parsing,
/// confidence scoring and the rule-based fallback. The calling convention
/// (text vs. vision) is carried by the [`Prompt`] variant, so one generic
/// runner drives every agent.
pub trait TaskAgent: Send + Sync + 'static {
    type Input: DeserializeOwned + Clone + Send + Sync + 'static;
    type Output: Serialize + Send + 'static;

    fn task_type(&self) -> TaskType;

    fn config(&self) -> &AgentConfig;

    /// Reject inputs no prompt or fallback can work with.
    fn validate_input(&self, _input: &Self::Input) -> Result<(), DomainError> {
        Ok(())
    }

    fn build_prompt(&self, input: &Self::Input) -> Prompt;

    /// Parse raw model text; `None` when nothing usable was found.
    fn try_parse(&self, raw: &str, input: &Self::Input) -> Option<Self::Output>;

    /// Parse raw model text, substituting the deterministic fallback on failure.
    fn parse_response(&self, raw: &str, input: &Self::Input) -> Self::Output {
        self.try_parse(raw, input)
            .unwrap_or_else(|| self.deterministic_fallback(input))
    }

    /// Heuristic confidence in `[0.0, 1.0]` for a parsed result.
    fn calculate_confidence(&self, result: &Self::Output, raw: &str) -> f64;

    /// Rule-based result with no external call. Must not fail.
    fn deterministic_fallback(&self, input: &Self::Input) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_accessors() {
        let text = Prompt::text("sys", "hello");
        assert_eq!(text.system(), "sys");
        assert_eq!(text.user(), "hello");
        assert!(text.image().is_none());

        let vision = Prompt::vision("sys", "what is this?", ImageSource::new("https://x/y.jpg"));
        assert_eq!(vision.image().unwrap().url, "https://x/y.jpg");
    }
}
