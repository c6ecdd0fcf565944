//! Consensus validation over a set of agent responses.

use super::result::ConsensusResult;
use super::stats::{mean, round_to, sample_std_dev};
use super::strategy::MergeStrategy;
use crate::agent::{AgentResponse, TaskType};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default minimum confidence for a response to count, and for the
/// global confidence of a valid result.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Default number of agreeing models required for a valid result.
pub const DEFAULT_MIN_AGREEMENT: usize = 2;

/// Minimum agreement score for a valid result.
const VALID_AGREEMENT: f64 = 0.5;

/// Below this agreement score a warning is emitted.
const LOW_AGREEMENT_WARNING: f64 = 0.7;

/// Weight of mean model confidence in the global confidence; agreement
/// takes the rest.
const CONFIDENCE_WEIGHT: f64 = 0.7;

/// Reconciles several models' responses into one result.
///
/// Holds configuration only, so one instance can serve any number of
/// concurrent validations.
///
/// # Example
///
/// ```
/// use nutri_domain::{AgentResponse, ConsensusValidator, TaskType};
/// use serde_json::json;
///
/// let responses = vec![
///     AgentResponse::new(json!({"calories": 520}), 0.85, "gpt-4o").unwrap(),
///     AgentResponse::new(json!({"calories": 540}), 0.82, "claude-sonnet-4.5").unwrap(),
/// ];
///
/// let result = ConsensusValidator::default().validate(&responses, TaskType::NutritionValidation, 2);
/// assert!(result.is_valid);
/// assert_eq!(result.merged_result.unwrap()["calories"], json!(530.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusValidator {
    min_confidence: f64,
}

impl Default for ConsensusValidator {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl ConsensusValidator {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Validate responses for a known task type.
    pub fn validate(
        &self,
        responses: &[AgentResponse],
        task_type: TaskType,
        min_agreement: usize,
    ) -> ConsensusResult {
        self.validate_with(
            responses,
            task_type.as_str(),
            MergeStrategy::for_task(task_type),
            min_agreement,
        )
    }

    /// Validate responses for a raw task tag.
    ///
    /// Tags that name no known task merge with
    /// [`MergeStrategy::HighestConfidence`].
    pub fn validate_tag(
        &self,
        responses: &[AgentResponse],
        task_tag: &str,
        min_agreement: usize,
    ) -> ConsensusResult {
        match task_tag.parse::<TaskType>() {
            Ok(task_type) => self.validate(responses, task_type, min_agreement),
            Err(_) => {
                warn!(
                    task_type = task_tag,
                    "Unknown task type, merging by highest confidence"
                );
                self.validate_with(
                    responses,
                    task_tag,
                    MergeStrategy::HighestConfidence,
                    min_agreement,
                )
            }
        }
    }

    fn validate_with(
        &self,
        responses: &[AgentResponse],
        task_label: &str,
        strategy: MergeStrategy,
        min_agreement: usize,
    ) -> ConsensusResult {
        if responses.is_empty() {
            info!(task_type = task_label, "Consensus skipped: no responses");
            return ConsensusResult::empty(task_label, strategy);
        }

        let mut warnings = Vec::new();

        let confident: Vec<&AgentResponse> = responses
            .iter()
            .filter(|r| r.confidence() >= self.min_confidence)
            .collect();
        // Too few confident answers: merge everything rather than refuse.
        let valid: Vec<&AgentResponse> = if confident.len() < min_agreement {
            if confident.len() < responses.len() {
                warnings.push(format!(
                    "only {} of {} responses met the confidence threshold ({:.2})",
                    confident.len(),
                    responses.len(),
                    self.min_confidence
                ));
            }
            responses.iter().collect()
        } else {
            confident
        };

        let individual_scores: Vec<f64> = valid.iter().map(|r| r.confidence()).collect();
        let outcome = strategy.merge(&valid);
        let agreement_score = Self::agreement_score(&individual_scores);
        let confidence = Self::global_confidence(&individual_scores, agreement_score);

        let count = valid.len();
        if count < min_agreement {
            warnings.push(format!("only {} models responded", count));
        }
        if agreement_score < LOW_AGREEMENT_WARNING {
            warnings.push(format!(
                "low agreement between models ({:.2})",
                agreement_score
            ));
        }
        if !outcome.disagreements.is_empty() {
            warnings.push(format!(
                "{} disagreements detected",
                outcome.disagreements.len()
            ));
        }

        let is_valid = count >= min_agreement
            && agreement_score >= VALID_AGREEMENT
            && confidence >= self.min_confidence;

        let models: Vec<String> = valid.iter().map(|r| r.model_used().to_string()).collect();

        info!(
            task_type = task_label,
            is_valid,
            confidence,
            agreement = agreement_score,
            models = count,
            "Consensus validated"
        );

        ConsensusResult {
            is_valid,
            confidence,
            merged_result: Some(outcome.merged),
            agreement_score,
            individual_scores,
            warnings,
            disagreements: outcome.disagreements,
            task_type: task_label.to_string(),
            strategy,
            models,
        }
    }

    /// Agreement in `[0, 1]` from the spread of confidences.
    ///
    /// Fewer than two scores agree trivially. Otherwise
    /// `max(0, 1 - 2 * sample_std_dev)`, rounded to two decimals.
    pub fn agreement_score(scores: &[f64]) -> f64 {
        match sample_std_dev(scores) {
            None => 1.0,
            Some(std_dev) => round_to((1.0 - 2.0 * std_dev).max(0.0), 2),
        }
    }

    /// `0.7 * mean(scores) + 0.3 * agreement`, rounded to two decimals;
    /// 0.0 without scores.
    pub fn global_confidence(scores: &[f64], agreement_score: f64) -> f64 {
        match mean(scores) {
            None => 0.0,
            Some(avg) => round_to(
                avg * CONFIDENCE_WEIGHT + agreement_score * (1.0 - CONFIDENCE_WEIGHT),
                2,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn response(result: Value, confidence: f64) -> AgentResponse {
        AgentResponse::new(result, confidence, format!("model-{}", confidence)).unwrap()
    }

    fn recipe(ingredients: &[&str]) -> Value {
        json!({"title": "Poulet au riz", "ingredients": ingredients, "prep_time": 30})
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let result = ConsensusValidator::default().validate(&[], TaskType::RecipeGeneration, 2);

        assert!(!result.is_valid);
        assert_eq!(result.confidence, 0.0);
        assert!(result.merged_result.is_none());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("no response"));
    }

    #[test]
    fn test_single_confident_response_with_min_agreement_one() {
        let responses = vec![response(json!({"message": "Drink water"}), 0.9)];
        let result = ConsensusValidator::default().validate(&responses, TaskType::Coaching, 1);

        assert!(result.confidence > 0.5);
        assert!(result.has_merged_result());
        assert!(result.is_valid);
        assert_eq!(result.agreement_score, 1.0);
        assert_eq!(result.confidence, 0.93);
    }

    #[test]
    fn test_clustered_confidences_agree() {
        let responses = vec![
            response(json!({"calories": 500}), 0.85),
            response(json!({"calories": 520}), 0.82),
        ];
        let result =
            ConsensusValidator::default().validate(&responses, TaskType::NutritionValidation, 2);

        assert!(result.is_valid);
        assert!(result.confidence > 0.7);
        assert!(result.agreement_score > 0.7);
        assert_eq!(result.agreement_score, 0.96);
        assert_eq!(result.confidence, 0.87);
        assert_eq!(result.individual_scores, vec![0.85, 0.82]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_recipe_ingredients_are_intersected() {
        let responses = vec![
            response(recipe(&["poulet", "riz", "carotte"]), 0.8),
            response(recipe(&["poulet", "riz", "brocoli"]), 0.8),
        ];
        let result =
            ConsensusValidator::default().validate(&responses, TaskType::RecipeGeneration, 2);

        let merged = result.merged_result.unwrap();
        let ingredients: Vec<&str> = merged["ingredients"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(ingredients, vec!["poulet", "riz"]);
        assert!(!ingredients.contains(&"carotte"));
        assert!(!ingredients.contains(&"brocoli"));
        assert_eq!(result.warnings, vec!["1 disagreements detected"]);
    }

    #[test]
    fn test_calorie_outlier_excluded() {
        let responses: Vec<_> = [500, 510, 520, 2000]
            .into_iter()
            .map(|c| response(json!({"calories": c}), 0.8))
            .collect();
        let result =
            ConsensusValidator::default().validate(&responses, TaskType::NutritionValidation, 2);

        let calories = result.merged_result.unwrap()["calories"].as_f64().unwrap();
        assert!(calories < 600.0);
        assert_eq!(result.disagreements, vec!["outliers on calories"]);
    }

    #[test]
    fn test_low_agreement_warning() {
        let responses = vec![
            response(json!({"calories": 500}), 0.9),
            response(json!({"calories": 800}), 0.3),
        ];
        let result =
            ConsensusValidator::default().validate(&responses, TaskType::NutritionValidation, 2);

        assert!(result.agreement_score < 0.8);
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.starts_with("low agreement between models"))
        );
        // Only one response was confident, so the filter was discarded.
        assert_eq!(result.individual_scores, vec![0.9, 0.3]);
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.starts_with("only 1 of 2 responses met"))
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn test_low_confidence_responses_are_filtered() {
        let responses = vec![
            response(json!({"calories": 500}), 0.8),
            response(json!({"calories": 900}), 0.2),
            response(json!({"calories": 520}), 0.8),
        ];
        let result =
            ConsensusValidator::default().validate(&responses, TaskType::NutritionValidation, 2);

        assert_eq!(result.individual_scores, vec![0.8, 0.8]);
        assert_eq!(result.merged_result.unwrap()["calories"], json!(510.0));
        assert_eq!(result.models, vec!["model-0.8", "model-0.8"]);
    }

    #[test]
    fn test_too_few_models_warning() {
        let responses = vec![response(json!({"calories": 500}), 0.9)];
        let result =
            ConsensusValidator::default().validate(&responses, TaskType::NutritionValidation, 2);

        assert!(!result.is_valid);
        assert!(result.warnings.contains(&"only 1 models responded".to_string()));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let responses = vec![
            response(recipe(&["poulet", "riz"]), 0.7),
            response(recipe(&["riz", "poulet", "oignon"]), 0.9),
            response(recipe(&["riz"]), 0.65),
        ];
        let validator = ConsensusValidator::default();
        let first = validator.validate(&responses, TaskType::RecipeGeneration, 2);
        let second = validator.validate(&responses, TaskType::RecipeGeneration, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let cases = [
            (
                TaskType::RecipeGeneration,
                vec![
                    response(json!({"title": "A", "ingredients": ["x", "y"], "prep_time": 20}), 0.7),
                    response(json!({"title": "B", "ingredients": ["y", "x"], "prep_time": 25}), 0.9),
                    response(json!({"title": "B", "ingredients": ["y"], "prep_time": 40}), 0.8),
                ],
            ),
            (
                TaskType::NutritionValidation,
                vec![
                    response(json!({"calories": 410.3, "protein": 22.1}), 0.7),
                    response(json!({"calories": 433.9, "protein": 25.4}), 0.9),
                    response(json!({"calories": 420.7, "fat": 12}), 0.8),
                ],
            ),
            (
                TaskType::FoodDetection,
                vec![
                    response(json!({"foods": [{"name": "Rice", "quantity": 150}]}), 0.7),
                    response(json!({"foods": [{"name": "rice", "quantity": 140}, {"name": "egg", "quantity": 1}]}), 0.9),
                    response(json!({"foods": [{"name": "egg", "quantity": 2}]}), 0.8),
                ],
            ),
        ];

        let validator = ConsensusValidator::default();
        for (task, responses) in cases {
            let forward = validator.validate(&responses, task, 2);
            let reversed: Vec<_> = responses.iter().rev().cloned().collect();
            let backward = validator.validate(&reversed, task, 2);

            assert_eq!(forward.merged_result, backward.merged_result, "{}", task);
            assert_eq!(forward.agreement_score, backward.agreement_score, "{}", task);
        }
    }

    #[test]
    fn test_unknown_tag_uses_highest_confidence() {
        let responses = vec![
            response(json!({"plan": "a"}), 0.7),
            response(json!({"plan": "b"}), 0.9),
        ];
        let result = ConsensusValidator::default().validate_tag(&responses, "weekly_digest", 2);

        assert_eq!(result.strategy, MergeStrategy::HighestConfidence);
        assert_eq!(result.task_type, "weekly_digest");
        assert_eq!(result.merged_result, Some(json!({"plan": "b"})));
        assert!(result.disagreements.is_empty());
    }

    #[test]
    fn test_known_tag_dispatches_to_task_strategy() {
        let responses = vec![response(json!({"foods": []}), 0.9)];
        let result = ConsensusValidator::default().validate_tag(&responses, "food_detection", 1);
        assert_eq!(result.strategy, MergeStrategy::FoodDetection);
    }

    #[test]
    fn test_global_confidence_against_threshold() {
        let responses = vec![
            response(json!({"calories": 500}), 0.55),
            response(json!({"calories": 510}), 0.5),
        ];
        let result = ConsensusValidator::default().validate(&responses, TaskType::NutritionValidation, 2);

        // 0.525 * 0.7 + 0.93 * 0.3 = 0.6465
        assert_eq!(result.agreement_score, 0.93);
        assert_eq!(result.confidence, 0.65);
        assert!(result.is_valid);

        let strict = ConsensusValidator::new(0.7).validate(&responses, TaskType::NutritionValidation, 2);
        assert!(!strict.is_valid);
    }

    #[test]
    fn test_global_confidence_without_scores() {
        assert_eq!(ConsensusValidator::global_confidence(&[], 1.0), 0.0);
    }
}
