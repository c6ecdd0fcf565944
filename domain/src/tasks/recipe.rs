//! Recipe generation agent.

use crate::agent::parsing::{extract_json, number_field, string_field, string_list};
use crate::agent::{AgentConfig, Prompt, TaskAgent, TaskType};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a chef and registered dietitian. \
Create one practical home recipe. Respond with a single JSON object only: \
{\"title\": string, \"ingredients\": [string], \"instructions\": [string], \
\"prep_time\": minutes, \"servings\": number, \"calories_per_serving\": number}.";

/// Staples assumed to be in any kitchen.
const PANTRY: [&str; 3] = ["olive oil", "salt", "black pepper"];

fn default_servings() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRequest {
    /// Ingredients the user has on hand
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Upper bound on preparation time, in minutes
    #[serde(default)]
    pub max_prep_time: Option<u32>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Minutes
    pub prep_time: u32,
    pub servings: u32,
    pub calories_per_serving: Option<f64>,
}

impl Recipe {
    /// Read a recipe from model JSON (an object, or a list whose first
    /// element is one). Requires a title and at least one ingredient.
    pub fn from_json(value: &Value) -> Option<Self> {
        let value = match value {
            Value::Array(items) => items.first()?,
            other => other,
        };
        let title = string_field(value, "title")?.to_string();
        let ingredients = string_list(value, "ingredients");
        if ingredients.is_empty() {
            return None;
        }

        Some(Self {
            title,
            ingredients,
            instructions: string_list(value, "instructions"),
            prep_time: number_field(value, "prep_time")
                .map(|m| m.max(0.0).round() as u32)
                .unwrap_or(0),
            servings: number_field(value, "servings")
                .map(|s| s.max(1.0).round() as u32)
                .unwrap_or(1),
            calories_per_serving: number_field(value, "calories_per_serving"),
        })
    }
}

pub struct RecipeAgent {
    config: AgentConfig,
}

impl RecipeAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

impl Default for RecipeAgent {
    fn default() -> Self {
        Self::new(AgentConfig::for_task(TaskType::RecipeGeneration))
    }
}

impl TaskAgent for RecipeAgent {
    type Input = RecipeRequest;
    type Output = Recipe;

    fn task_type(&self) -> TaskType {
        TaskType::RecipeGeneration
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn validate_input(&self, input: &RecipeRequest) -> Result<(), DomainError> {
        if input.ingredients.iter().all(|i| i.trim().is_empty()) {
            return Err(DomainError::InvalidInput(
                "recipe request needs at least one ingredient".to_string(),
            ));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &RecipeRequest) -> Prompt {
        let mut user = format!(
            "Available ingredients: {}.\nServings: {}.",
            input.ingredients.join(", "),
            input.servings
        );
        if !input.dietary_restrictions.is_empty() {
            user.push_str(&format!(
                "\nDietary restrictions (strict): {}.",
                input.dietary_restrictions.join(", ")
            ));
        }
        if let Some(max) = input.max_prep_time {
            user.push_str(&format!("\nTotal preparation time must not exceed {} minutes.", max));
        }
        if let Some(cuisine) = &input.cuisine {
            user.push_str(&format!("\nPreferred cuisine: {}.", cuisine));
        }
        Prompt::text(SYSTEM_PROMPT, user)
    }

    fn try_parse(&self, raw: &str, _input: &RecipeRequest) -> Option<Recipe> {
        Recipe::from_json(&extract_json(raw)?)
    }

    fn calculate_confidence(&self, result: &Recipe, _raw: &str) -> f64 {
        let mut score: f64 = 0.45;
        if result.ingredients.len() >= 3 {
            score += 0.15;
        }
        if result.instructions.len() >= 3 {
            score += 0.2;
        } else if result.instructions.is_empty() {
            score -= 0.15;
        }
        if result.prep_time > 0 {
            score += 0.1;
        }
        if result.calories_per_serving.is_some_and(|c| c > 0.0) {
            score += 0.05;
        }
        score.clamp(0.0, 1.0)
    }

    fn deterministic_fallback(&self, input: &RecipeRequest) -> Recipe {
        let mut ingredients: Vec<String> = input
            .ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        let main = ingredients
            .first()
            .cloned()
            .unwrap_or_else(|| "vegetable".to_string());
        for staple in PANTRY {
            if !ingredients.iter().any(|i| i.eq_ignore_ascii_case(staple)) {
                ingredients.push(staple.to_string());
            }
        }

        let title = match &input.cuisine {
            Some(cuisine) => format!("{} style {} skillet", cuisine, main),
            None => format!("Simple {} skillet", main),
        };
        let base_time = 15 + 5 * input.ingredients.len() as u32;
        let prep_time = input
            .max_prep_time
            .map_or(base_time, |max| base_time.min(max.max(5)));

        Recipe {
            title,
            instructions: vec![
                "Wash and cut all ingredients into bite-sized pieces.".to_string(),
                "Heat the olive oil in a large pan over medium heat.".to_string(),
                format!(
                    "Cook the {} first, then add the remaining ingredients.",
                    main
                ),
                "Season with salt and pepper, stir until cooked through, and serve.".to_string(),
            ],
            ingredients,
            prep_time,
            servings: input.servings.max(1),
            calories_per_serving: None,
        }
    }
}
