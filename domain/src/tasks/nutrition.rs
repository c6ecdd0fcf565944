//! Nutrition estimation agent (merged under `nutrition_validation`).

use super::atwater_gap;
use crate::agent::parsing::{extract_json, number_field};
use crate::agent::{AgentConfig, Prompt, TaskAgent, TaskType};
use crate::consensus::stats::round_to;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a nutrition database. Estimate the total nutrition \
of the listed foods. Respond with JSON only: {\"calories\": kcal, \"protein\": g, \
\"carbs\": g, \"fat\": g, \"fiber\": g}.";

/// Reference values per 100 g: (names, kcal, protein, carbs, fat, fiber).
type Reference = (&'static [&'static str], f64, f64, f64, f64, f64);

const REFERENCE_TABLE: &[Reference] = &[
    (&["chicken breast", "chicken", "poulet", "blanc de poulet"], 165.0, 31.0, 0.0, 3.6, 0.0),
    (&["rice", "riz", "cooked rice"], 130.0, 2.7, 28.0, 0.3, 0.4),
    (&["broccoli", "brocoli"], 34.0, 2.8, 7.0, 0.4, 2.6),
    (&["carrot", "carotte"], 41.0, 0.9, 10.0, 0.2, 2.8),
    (&["egg", "oeuf", "œuf"], 155.0, 13.0, 1.1, 11.0, 0.0),
    (&["apple", "pomme"], 52.0, 0.3, 14.0, 0.2, 2.4),
    (&["banana", "banane"], 89.0, 1.1, 23.0, 0.3, 2.6),
    (&["bread", "pain"], 265.0, 9.0, 49.0, 3.2, 2.7),
    (&["pasta", "pâtes", "pates"], 131.0, 5.0, 25.0, 1.1, 1.8),
    (&["salmon", "saumon"], 208.0, 20.0, 0.0, 13.0, 0.0),
    (&["beef", "boeuf", "bœuf", "steak"], 250.0, 26.0, 0.0, 15.0, 0.0),
    (&["milk", "lait"], 42.0, 3.4, 5.0, 1.0, 0.0),
    (&["greek yogurt", "yogurt", "yaourt"], 59.0, 10.0, 3.6, 0.4, 0.0),
    (&["cheese", "fromage"], 402.0, 25.0, 1.3, 33.0, 0.0),
    (&["potato", "pomme de terre", "pommes de terre"], 77.0, 2.0, 17.0, 0.1, 2.2),
    (&["oats", "oatmeal", "avoine", "flocons d'avoine"], 389.0, 17.0, 66.0, 7.0, 10.6),
    (&["olive oil", "huile d'olive"], 884.0, 0.0, 0.0, 100.0, 0.0),
    (&["tomato", "tomate"], 18.0, 0.9, 3.9, 0.2, 1.2),
    (&["lentils", "lentilles"], 116.0, 9.0, 20.0, 0.4, 7.9),
    (&["tofu"], 76.0, 8.0, 1.9, 4.8, 0.3),
    (&["salad", "salade", "lettuce", "laitue"], 15.0, 1.4, 2.9, 0.2, 1.3),
];

/// Used for foods missing from the reference table.
const GENERIC_FOOD: Reference = (&[], 150.0, 6.0, 20.0, 5.0, 2.0);

/// Reference entry for a food name: exact alias first, then the longest
/// alias contained in the name.
fn lookup(name: &str) -> &'static Reference {
    let name = name.trim().to_lowercase();
    REFERENCE_TABLE
        .iter()
        .find(|entry| entry.0.contains(&name.as_str()))
        .or_else(|| {
            REFERENCE_TABLE
                .iter()
                .filter_map(|entry| {
                    entry
                        .0
                        .iter()
                        .filter(|alias| name.contains(**alias))
                        .map(|alias| alias.len())
                        .max()
                        .map(|len| (len, entry))
                })
                .max_by_key(|(len, _)| *len)
                .map(|(_, entry)| entry)
        })
        .unwrap_or(&GENERIC_FOOD)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPortion {
    pub name: String,
    pub grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRequest {
    pub foods: Vec<FoodPortion>,
}

/// Totals for a set of foods (kcal and grams).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl NutritionEstimate {
    /// Read totals from model JSON: the object itself, or its `total` field.
    /// Requires calories.
    pub fn from_json(value: &Value) -> Option<Self> {
        let value = value.get("total").filter(|t| t.is_object()).unwrap_or(value);
        Some(Self {
            calories: number_field(value, "calories")?,
            protein: number_field(value, "protein").unwrap_or(0.0),
            carbs: number_field(value, "carbs").unwrap_or(0.0),
            fat: number_field(value, "fat").unwrap_or(0.0),
            fiber: number_field(value, "fiber").unwrap_or(0.0),
        })
    }
}

pub struct NutritionAgent {
    config: AgentConfig,
}

impl NutritionAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

impl Default for NutritionAgent {
    fn default() -> Self {
        Self::new(AgentConfig::for_task(TaskType::NutritionValidation))
    }
}

impl TaskAgent for NutritionAgent {
    type Input = NutritionRequest;
    type Output = NutritionEstimate;

    fn task_type(&self) -> TaskType {
        TaskType::NutritionValidation
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn validate_input(&self, input: &NutritionRequest) -> Result<(), DomainError> {
        if input.foods.is_empty() {
            return Err(DomainError::InvalidInput("no foods to estimate".to_string()));
        }
        if let Some(bad) = input.foods.iter().find(|f| f.grams.is_nan() || f.grams <= 0.0) {
            return Err(DomainError::InvalidInput(format!(
                "portion of {} must be positive, got {} g",
                bad.name, bad.grams
            )));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &NutritionRequest) -> Prompt {
        let foods = input
            .foods
            .iter()
            .map(|f| format!("- {}: {} g", f.name, f.grams))
            .collect::<Vec<_>>()
            .join("\n");
        Prompt::text(SYSTEM_PROMPT, format!("Foods:\n{}", foods))
    }

    fn try_parse(&self, raw: &str, _input: &NutritionRequest) -> Option<NutritionEstimate> {
        NutritionEstimate::from_json(&extract_json(raw)?)
    }

    fn calculate_confidence(&self, result: &NutritionEstimate, _raw: &str) -> f64 {
        if result.protein == 0.0 && result.carbs == 0.0 && result.fat == 0.0 {
            return if result.calories > 0.0 { 0.5 } else { 0.1 };
        }
        match atwater_gap(result.calories, result.protein, result.carbs, result.fat) {
            None => 0.1,
            Some(gap) if gap <= 0.10 => 0.9,
            Some(gap) if gap <= 0.20 => 0.75,
            Some(gap) if gap <= 0.35 => 0.6,
            Some(_) => 0.4,
        }
    }

    fn deterministic_fallback(&self, input: &NutritionRequest) -> NutritionEstimate {
        let mut total = NutritionEstimate {
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            fiber: 0.0,
        };
        for food in &input.foods {
            let (_, kcal, protein, carbs, fat, fiber) = *lookup(&food.name);
            let factor = food.grams.max(0.0) / 100.0;
            total.calories += kcal * factor;
            total.protein += protein * factor;
            total.carbs += carbs * factor;
            total.fat += fat * factor;
            total.fiber += fiber * factor;
        }
        NutritionEstimate {
            calories: round_to(total.calories, 1),
            protein: round_to(total.protein, 1),
            carbs: round_to(total.carbs, 1),
            fat: round_to(total.fat, 1),
            fiber: round_to(total.fiber, 1),
        }
    }
}

/// Name of the reference entry used for a food, for diagnostics.
pub fn reference_name(food: &str) -> Option<&'static str> {
    lookup(food).0.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NutritionRequest {
        NutritionRequest {
            foods: vec![
                FoodPortion {
                    name: "Poulet".to_string(),
                    grams: 150.0,
                },
                FoodPortion {
                    name: "riz".to_string(),
                    grams: 200.0,
                },
            ],
        }
    }

    #[test]
    fn test_lookup_prefers_longest_alias() {
        assert_eq!(reference_name("pomme de terre vapeur"), Some("potato"));
        assert_eq!(reference_name("Pomme"), Some("apple"));
        assert_eq!(reference_name("grilled chicken breast"), Some("chicken breast"));
        assert_eq!(reference_name("quinoa"), None);
    }

    #[test]
    fn test_fallback_scales_reference_values() {
        let estimate = NutritionAgent::default().deterministic_fallback(&request());
        // 1.5 * 165 + 2 * 130
        assert_eq!(estimate.calories, 507.5);
        assert_eq!(estimate.protein, 51.9);
        assert_eq!(estimate.carbs, 56.0);
    }

    #[test]
    fn test_unknown_food_uses_generic_values() {
        let agent = NutritionAgent::default();
        let estimate = agent.deterministic_fallback(&NutritionRequest {
            foods: vec![FoodPortion {
                name: "quinoa".to_string(),
                grams: 100.0,
            }],
        });
        assert_eq!(estimate.calories, 150.0);
    }

    #[test]
    fn test_parse_total_object() {
        let agent = NutritionAgent::default();
        let raw = r#"Estimate: {"total": {"calories": 510, "protein": "52 g", "carbs": 56, "fat": 6}}"#;
        let estimate = agent.try_parse(raw, &request()).unwrap();
        assert_eq!(estimate.protein, 52.0);
        assert_eq!(estimate.fiber, 0.0);
    }

    #[test]
    fn test_confidence_from_macro_consistency() {
        let agent = NutritionAgent::default();
        let consistent = NutritionEstimate {
            calories: 500.0,
            protein: 50.0,
            carbs: 50.0,
            fat: 10.0,
            fiber: 2.0,
        };
        assert_eq!(agent.calculate_confidence(&consistent, ""), 0.9);

        let inconsistent = NutritionEstimate {
            calories: 1500.0,
            ..consistent.clone()
        };
        assert_eq!(agent.calculate_confidence(&inconsistent, ""), 0.4);
    }

    #[test]
    fn test_validate_rejects_non_positive_portions() {
        let agent = NutritionAgent::default();
        let bad = NutritionRequest {
            foods: vec![FoodPortion {
                name: "riz".to_string(),
                grams: 0.0,
            }],
        };
        assert!(agent.validate_input(&bad).is_err());
        assert!(agent.validate_input(&NutritionRequest { foods: vec![] }).is_err());
    }
}
