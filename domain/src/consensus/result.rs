//! Outcome of a consensus validation.

use super::strategy::MergeStrategy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reconciled outcome of one `validate` call.
///
/// `is_valid == false` is a quality signal, not an error: callers decide
/// whether to use the merged result anyway, retry, or escalate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Enough confident responses that agree closely enough
    pub is_valid: bool,
    /// Global confidence (weighted mean confidence and agreement)
    pub confidence: f64,
    /// Task-specific merged payload; `None` when there was nothing to merge
    pub merged_result: Option<Value>,
    /// How tightly the accepted responses' confidences cluster (0.0 to 1.0)
    pub agreement_score: f64,
    /// Confidence of each accepted response, in input order
    pub individual_scores: Vec<f64>,
    /// Human-readable quality warnings
    pub warnings: Vec<String>,
    /// Task-specific conflicts found while merging
    pub disagreements: Vec<String>,
    /// Task tag the validation ran for
    pub task_type: String,
    /// Strategy used to merge
    pub strategy: MergeStrategy,
    /// Models behind the accepted responses, in input order
    pub models: Vec<String>,
}

impl ConsensusResult {
    /// Invalid result for an empty response set
    pub fn empty(task_type: impl Into<String>, strategy: MergeStrategy) -> Self {
        Self {
            is_valid: false,
            confidence: 0.0,
            merged_result: None,
            agreement_score: 0.0,
            individual_scores: Vec::new(),
            warnings: vec!["no responses to validate".to_string()],
            disagreements: Vec::new(),
            task_type: task_type.into(),
            strategy,
            models: Vec::new(),
        }
    }

    /// Whether a non-empty merged payload is available
    pub fn has_merged_result(&self) -> bool {
        match &self.merged_result {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }

    /// One-line summary, e.g. "valid (confidence 0.87, agreement 0.96, 2 models)"
    pub fn summary(&self) -> String {
        format!(
            "{} (confidence {:.2}, agreement {:.2}, {} models)",
            if self.is_valid { "valid" } else { "invalid" },
            self.confidence,
            self.agreement_score,
            self.individual_scores.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_result() {
        let result = ConsensusResult::empty("coaching", MergeStrategy::Coaching);
        assert!(!result.is_valid);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.has_merged_result());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_has_merged_result() {
        let mut result = ConsensusResult::empty("recipe_generation", MergeStrategy::Recipe);
        result.merged_result = Some(json!({}));
        assert!(!result.has_merged_result());
        result.merged_result = Some(json!({"title": "Soup"}));
        assert!(result.has_merged_result());
    }

    #[test]
    fn test_summary() {
        let mut result = ConsensusResult::empty("coaching", MergeStrategy::Coaching);
        result.is_valid = true;
        result.confidence = 0.874;
        result.agreement_score = 0.96;
        result.individual_scores = vec![0.85, 0.82];
        assert_eq!(
            result.summary(),
            "valid (confidence 0.87, agreement 0.96, 2 models)"
        );
    }
}
