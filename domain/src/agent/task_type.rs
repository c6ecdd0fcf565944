//! Task types handled by agents and the consensus validator.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of tasks the system knows how to run and merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    RecipeGeneration,
    FoodDetection,
    NutritionValidation,
    ProfileAnalysis,
    MealPlanGeneration,
    Coaching,
}

impl TaskType {
    /// All task types, in registry order
    pub const ALL: [TaskType; 6] = [
        TaskType::RecipeGeneration,
        TaskType::FoodDetection,
        TaskType::NutritionValidation,
        TaskType::ProfileAnalysis,
        TaskType::MealPlanGeneration,
        TaskType::Coaching,
    ];

    /// Wire tag of this task type
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::RecipeGeneration => "recipe_generation",
            TaskType::FoodDetection => "food_detection",
            TaskType::NutritionValidation => "nutrition_validation",
            TaskType::ProfileAnalysis => "profile_analysis",
            TaskType::MealPlanGeneration => "meal_plan_generation",
            TaskType::Coaching => "coaching",
        }
    }

    /// Whether the task's prompt carries an image
    pub fn requires_vision(&self) -> bool {
        matches!(self, TaskType::FoodDetection)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownTaskType(s.to_string()))
    }
}
