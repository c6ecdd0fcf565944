//! Merge strategy selection.
//!
//! Each [`TaskType`] maps to exactly one [`MergeStrategy`]; the match is
//! exhaustive so a new task type cannot silently fall through to the
//! default. Raw string tags that name no task use
//! [`MergeStrategy::HighestConfidence`].

use super::merge::{self, MergeOutcome};
use crate::agent::{AgentResponse, TaskType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the results of several responses are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Majority title, ingredient intersection, mean prep time
    Recipe,
    /// Foods seen by at least two models, mean quantities
    FoodDetection,
    /// Outlier-trimmed mean per nutrition field
    NumericFields,
    /// Free-text advice: the most confident answer verbatim
    Coaching,
    /// The most confident answer verbatim
    HighestConfidence,
}

impl MergeStrategy {
    pub fn for_task(task: TaskType) -> Self {
        match task {
            TaskType::RecipeGeneration => MergeStrategy::Recipe,
            TaskType::FoodDetection => MergeStrategy::FoodDetection,
            TaskType::NutritionValidation | TaskType::ProfileAnalysis => {
                MergeStrategy::NumericFields
            }
            TaskType::Coaching => MergeStrategy::Coaching,
            TaskType::MealPlanGeneration => MergeStrategy::HighestConfidence,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Recipe => "recipe",
            MergeStrategy::FoodDetection => "food_detection",
            MergeStrategy::NumericFields => "numeric_fields",
            MergeStrategy::Coaching => "coaching",
            MergeStrategy::HighestConfidence => "highest_confidence",
        }
    }

    /// Merge the results of `responses` into one payload.
    pub fn merge(&self, responses: &[&AgentResponse]) -> MergeOutcome {
        match self {
            MergeStrategy::Recipe => merge::merge_recipes(responses),
            MergeStrategy::FoodDetection => merge::merge_food_detections(responses),
            MergeStrategy::NumericFields => merge::merge_numeric_fields(responses),
            MergeStrategy::Coaching | MergeStrategy::HighestConfidence => {
                merge::highest_confidence(responses)
            }
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_task_has_a_strategy() {
        assert_eq!(
            MergeStrategy::for_task(TaskType::ProfileAnalysis),
            MergeStrategy::NumericFields
        );
        assert_eq!(
            MergeStrategy::for_task(TaskType::NutritionValidation),
            MergeStrategy::NumericFields
        );
        assert_eq!(
            MergeStrategy::for_task(TaskType::MealPlanGeneration),
            MergeStrategy::HighestConfidence
        );
    }
}
