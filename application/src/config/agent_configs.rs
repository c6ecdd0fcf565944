//! Per-task agent configuration set.

use nutri_domain::{AgentConfig, TaskType};

/// One [`AgentConfig`] per task type, injected into the orchestrator.
///
/// Each field is read-only after the agents are built; there is no global
/// registry to mutate.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfigs {
    pub recipe_generation: AgentConfig,
    pub food_detection: AgentConfig,
    pub nutrition_validation: AgentConfig,
    pub profile_analysis: AgentConfig,
    pub meal_plan_generation: AgentConfig,
    pub coaching: AgentConfig,
}

impl Default for AgentConfigs {
    fn default() -> Self {
        Self {
            recipe_generation: AgentConfig::for_task(TaskType::RecipeGeneration),
            food_detection: AgentConfig::for_task(TaskType::FoodDetection),
            nutrition_validation: AgentConfig::for_task(TaskType::NutritionValidation),
            profile_analysis: AgentConfig::for_task(TaskType::ProfileAnalysis),
            meal_plan_generation: AgentConfig::for_task(TaskType::MealPlanGeneration),
            coaching: AgentConfig::for_task(TaskType::Coaching),
        }
    }
}

impl AgentConfigs {
    pub fn get(&self, task: TaskType) -> &AgentConfig {
        match task {
            TaskType::RecipeGeneration => &self.recipe_generation,
            TaskType::FoodDetection => &self.food_detection,
            TaskType::NutritionValidation => &self.nutrition_validation,
            TaskType::ProfileAnalysis => &self.profile_analysis,
            TaskType::MealPlanGeneration => &self.meal_plan_generation,
            TaskType::Coaching => &self.coaching,
        }
    }

    pub fn get_mut(&mut self, task: TaskType) -> &mut AgentConfig {
        match task {
            TaskType::RecipeGeneration => &mut self.recipe_generation,
            TaskType::FoodDetection => &mut self.food_detection,
            TaskType::NutritionValidation => &mut self.nutrition_validation,
            TaskType::ProfileAnalysis => &mut self.profile_analysis,
            TaskType::MealPlanGeneration => &mut self.meal_plan_generation,
            TaskType::Coaching => &mut self.coaching,
        }
    }

    /// Replace the configuration of one task
    pub fn with(mut self, task: TaskType, config: AgentConfig) -> Self {
        *self.get_mut(task) = config;
        self
    }

    /// Apply the same change to every task's configuration
    pub fn map_all(mut self, f: impl Fn(AgentConfig) -> AgentConfig) -> Self {
        for task in TaskType::ALL {
            let config = self.get(task).clone();
            *self.get_mut(task) = f(config);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutri_domain::Model;

    #[test]
    fn test_defaults_follow_task_vision_needs() {
        let configs = AgentConfigs::default();
        assert!(configs.food_detection.fallback_model.is_none());
        assert!(configs.coaching.fallback_model.is_some());
    }

    #[test]
    fn test_with_and_map_all() {
        let configs = AgentConfigs::default()
            .with(
                TaskType::Coaching,
                AgentConfig::default().with_primary_models(vec![Model::Gpt41]),
            )
            .map_all(|c| c.with_max_fan_out(2));

        assert_eq!(configs.coaching.primary_models, vec![Model::Gpt41]);
        assert!(TaskType::ALL.iter().all(|t| configs.get(*t).max_fan_out == 2));
    }
}
