//! The uniform envelope produced by every agent invocation.

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Confidence assigned to a deterministic fallback result.
pub const DETERMINISTIC_CONFIDENCE: f64 = 0.5;

/// One agent invocation's outcome.
///
/// Immutable once built: the confidence range is checked at construction
/// (and on deserialization), never at merge time.
///
/// # Example
///
/// ```
/// use nutri_domain::AgentResponse;
/// use serde_json::json;
///
/// let response = AgentResponse::new(json!({"calories": 520}), 0.85, "gpt-4o").unwrap();
/// assert_eq!(response.model_used(), "gpt-4o");
/// assert!(!response.used_fallback());
///
/// assert!(AgentResponse::new(json!({}), 1.5, "gpt-4o").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAgentResponse")]
pub struct AgentResponse {
    result: Value,
    confidence: f64,
    model_used: String,
    reasoning: String,
    used_fallback: bool,
    metadata: Map<String, Value>,
}

impl AgentResponse {
    /// Create a response, rejecting confidences outside `[0.0, 1.0]`
    pub fn new(
        result: Value,
        confidence: f64,
        model_used: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::InvalidConfidence(confidence));
        }

        Ok(Self {
            result,
            confidence,
            model_used: model_used.into(),
            reasoning: String::new(),
            used_fallback: false,
            metadata: Map::new(),
        })
    }

    /// Response for a rule-based result that made no model call
    pub fn deterministic(result: Value, reasoning: impl Into<String>) -> Self {
        Self {
            result,
            confidence: DETERMINISTIC_CONFIDENCE,
            model_used: Model::Deterministic.to_string(),
            reasoning: reasoning.into(),
            used_fallback: true,
            metadata: Map::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_fallback(mut self, used_fallback: bool) -> Self {
        self.used_fallback = used_fallback;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn result(&self) -> &Value {
        &self.result
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn model_used(&self) -> &str {
        &self.model_used
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Consume the response, keeping only its payload
    pub fn into_result(self) -> Value {
        self.result
    }
}

/// Unchecked wire shape, validated into [`AgentResponse`].
#[derive(Deserialize)]
struct RawAgentResponse {
    result: Value,
    confidence: f64,
    model_used: String,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    used_fallback: bool,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl TryFrom<RawAgentResponse> for AgentResponse {
    type Error = DomainError;

    fn try_from(raw: RawAgentResponse) -> Result<Self, Self::Error> {
        let mut response = AgentResponse::new(raw.result, raw.confidence, raw.model_used)?
            .with_reasoning(raw.reasoning)
            .with_fallback(raw.used_fallback);
        response.metadata = raw.metadata;
        Ok(response)
    }
}
