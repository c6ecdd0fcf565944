//! Meal plan generation agent.

use crate::agent::parsing::{extract_json, number_field, string_field};
use crate::agent::{AgentConfig, Prompt, TaskAgent, TaskType};
use crate::consensus::stats::round_to;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a dietitian planning meals. Build a meal plan that \
hits the daily calorie target and respects every dietary restriction. Respond with JSON \
only: {\"days\": [{\"day\": n, \"meals\": [{\"meal_type\": string, \"name\": string, \
\"calories\": kcal}], \"total_calories\": kcal}]}.";

fn default_days() -> u32 {
    1
}

fn default_meals_per_day() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanRequest {
    /// Daily calorie target
    pub target_calories: f64,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_meals_per_day")]
    pub meals_per_day: u32,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub meal_type: String,
    pub name: String,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub meals: Vec<PlannedMeal>,
    pub total_calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub days: Vec<DayPlan>,
}

impl MealPlan {
    /// Read a plan from model JSON. Accepts `{"days": [...]}` or a bare
    /// list of days; days without meals are dropped.
    pub fn from_json(value: &Value) -> Option<Self> {
        let days = match value {
            Value::Array(days) => days,
            other => other.get("days")?.as_array()?,
        };
        let days: Vec<DayPlan> = days
            .iter()
            .enumerate()
            .filter_map(|(index, day)| day_from_json(day, index as u32 + 1))
            .collect();
        (!days.is_empty()).then_some(Self { days })
    }

    /// Mean daily total across the plan.
    pub fn average_daily_calories(&self) -> Option<f64> {
        if self.days.is_empty() {
            return None;
        }
        let total: f64 = self.days.iter().map(|d| d.total_calories).sum();
        Some(total / self.days.len() as f64)
    }
}

fn day_from_json(value: &Value, position: u32) -> Option<DayPlan> {
    let meals: Vec<PlannedMeal> = value
        .get("meals")?
        .as_array()?
        .iter()
        .filter_map(|meal| {
            Some(PlannedMeal {
                name: string_field(meal, "name")?.to_string(),
                meal_type: string_field(meal, "meal_type")
                    .unwrap_or("meal")
                    .to_string(),
                calories: number_field(meal, "calories").unwrap_or(0.0),
            })
        })
        .collect();
    if meals.is_empty() {
        return None;
    }
    let total_calories = number_field(value, "total_calories")
        .unwrap_or_else(|| meals.iter().map(|m| m.calories).sum());
    Some(DayPlan {
        day: number_field(value, "day")
            .map(|d| d.max(1.0) as u32)
            .unwrap_or(position),
        meals,
        total_calories,
    })
}

struct CatalogMeal {
    name: &'static str,
    vegetarian: bool,
    vegan: bool,
}

const fn meal(name: &'static str, vegetarian: bool, vegan: bool) -> CatalogMeal {
    CatalogMeal {
        name,
        vegetarian,
        vegan,
    }
}

const BREAKFASTS: &[CatalogMeal] = &[
    meal("Oatmeal with berries and almonds", true, true),
    meal("Greek yogurt with granola", true, false),
    meal("Scrambled eggs on wholegrain toast", true, false),
    meal("Tofu scramble with spinach", true, true),
];

const MAINS: &[CatalogMeal] = &[
    meal("Grilled chicken with quinoa and vegetables", false, false),
    meal("Lentil curry with brown rice", true, true),
    meal("Baked salmon with sweet potato", false, false),
    meal("Chickpea and vegetable stir-fry", true, true),
    meal("Turkey and bean chili", false, false),
    meal("Vegetable omelette with salad", true, false),
];

const SNACKS: &[CatalogMeal] = &[
    meal("Apple with peanut butter", true, true),
    meal("Cottage cheese with fruit", true, false),
    meal("Hummus with carrot sticks", true, true),
];

/// Meal slots and their share of the daily calories.
fn slots(meals_per_day: u32) -> Vec<(&'static str, f64)> {
    match meals_per_day {
        0..=2 => vec![("lunch", 0.5), ("dinner", 0.5)],
        3 => vec![("breakfast", 0.3), ("lunch", 0.4), ("dinner", 0.3)],
        4 => vec![
            ("breakfast", 0.25),
            ("lunch", 0.35),
            ("dinner", 0.3),
            ("snack", 0.1),
        ],
        n => {
            let snacks = n - 3;
            let share = 0.1;
            let mains = (1.0 - share * snacks as f64) / 3.0;
            let mut slots = vec![("breakfast", mains), ("lunch", mains), ("dinner", mains)];
            slots.extend((0..snacks).map(|_| ("snack", share)));
            slots
        }
    }
}

fn allowed(meal: &CatalogMeal, restrictions: &[String]) -> bool {
    restrictions.iter().all(|r| match r.to_lowercase().as_str() {
        "vegan" => meal.vegan,
        "vegetarian" => meal.vegetarian,
        _ => true,
    })
}

pub struct MealPlanAgent {
    config: AgentConfig,
}

impl MealPlanAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

impl Default for MealPlanAgent {
    fn default() -> Self {
        Self::new(AgentConfig::for_task(TaskType::MealPlanGeneration))
    }
}

impl TaskAgent for MealPlanAgent {
    type Input = MealPlanRequest;
    type Output = MealPlan;

    fn task_type(&self) -> TaskType {
        TaskType::MealPlanGeneration
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn validate_input(&self, input: &MealPlanRequest) -> Result<(), DomainError> {
        if !(800.0..=6000.0).contains(&input.target_calories) {
            return Err(DomainError::InvalidInput(format!(
                "target calories out of range: {}",
                input.target_calories
            )));
        }
        if !(1..=14).contains(&input.days) {
            return Err(DomainError::InvalidInput(format!(
                "plan length must be 1-14 days, got {}",
                input.days
            )));
        }
        if !(2..=6).contains(&input.meals_per_day) {
            return Err(DomainError::InvalidInput(format!(
                "meals per day must be 2-6, got {}",
                input.meals_per_day
            )));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &MealPlanRequest) -> Prompt {
        let mut user = format!(
            "Daily calorie target: {} kcal.\nDays: {}.\nMeals per day: {}.",
            input.target_calories, input.days, input.meals_per_day
        );
        if !input.dietary_restrictions.is_empty() {
            user.push_str(&format!(
                "\nDietary restrictions: {}.",
                input.dietary_restrictions.join(", ")
            ));
        }
        Prompt::text(SYSTEM_PROMPT, user)
    }

    fn try_parse(&self, raw: &str, _input: &MealPlanRequest) -> Option<MealPlan> {
        MealPlan::from_json(&extract_json(raw)?)
    }

    fn calculate_confidence(&self, result: &MealPlan, _raw: &str) -> f64 {
        let mut score: f64 = 0.4;
        if result.days.iter().all(|d| d.meals.len() >= 2) {
            score += 0.2;
        }
        if result
            .days
            .iter()
            .all(|d| d.meals.iter().all(|m| m.calories > 0.0))
        {
            score += 0.2;
        }
        let consistent = result.days.iter().all(|d| {
            let sum: f64 = d.meals.iter().map(|m| m.calories).sum();
            d.total_calories > 0.0 && (sum - d.total_calories).abs() / d.total_calories <= 0.05
        });
        if consistent {
            score += 0.1;
        }
        score.clamp(0.0, 1.0)
    }

    fn deterministic_fallback(&self, input: &MealPlanRequest) -> MealPlan {
        let pick = |catalog: &'static [CatalogMeal], offset: usize| -> &'static str {
            let options: Vec<&CatalogMeal> = catalog
                .iter()
                .filter(|m| allowed(m, &input.dietary_restrictions))
                .collect();
            let options = if options.is_empty() {
                catalog.iter().collect()
            } else {
                options
            };
            options[offset % options.len()].name
        };

        let slots = slots(input.meals_per_day);
        let days = (0..input.days.max(1))
            .map(|day| {
                let offset = day as usize;
                let meals: Vec<PlannedMeal> = slots
                    .iter()
                    .enumerate()
                    .map(|(slot, (meal_type, share))| {
                        let name = match *meal_type {
                            "breakfast" => pick(BREAKFASTS, offset),
                            "snack" => pick(SNACKS, offset + slot),
                            // lunch and dinner draw different mains on the same day
                            _ => pick(MAINS, offset * 2 + slot),
                        };
                        PlannedMeal {
                            meal_type: meal_type.to_string(),
                            name: name.to_string(),
                            calories: round_to(input.target_calories * share, 0),
                        }
                    })
                    .collect();
                DayPlan {
                    day: day + 1,
                    total_calories: meals.iter().map(|m| m.calories).sum(),
                    meals,
                }
            })
            .collect();
        MealPlan { days }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(days: u32, meals_per_day: u32) -> MealPlanRequest {
        MealPlanRequest {
            target_calories: 2000.0,
            days,
            meals_per_day,
            dietary_restrictions: vec![],
        }
    }

    #[test]
    fn test_fallback_splits_calories() {
        let plan = MealPlanAgent::default().deterministic_fallback(&request(2, 3));

        assert_eq!(plan.days.len(), 2);
        let day = &plan.days[0];
        let calories: Vec<f64> = day.meals.iter().map(|m| m.calories).collect();
        assert_eq!(calories, vec![600.0, 800.0, 600.0]);
        assert_eq!(day.total_calories, 2000.0);
        assert_eq!(plan.days[1].day, 2);
        assert_ne!(plan.days[0].meals[1].name, plan.days[1].meals[1].name);
    }

    #[test]
    fn test_fallback_four_meals() {
        let plan = MealPlanAgent::default().deterministic_fallback(&request(1, 4));
        let types: Vec<&str> = plan.days[0]
            .meals
            .iter()
            .map(|m| m.meal_type.as_str())
            .collect();
        assert_eq!(types, vec!["breakfast", "lunch", "dinner", "snack"]);
        assert_eq!(plan.days[0].meals[3].calories, 200.0);
    }

    #[test]
    fn test_fallback_respects_vegan() {
        let mut req = request(3, 4);
        req.dietary_restrictions = vec!["Vegan".to_string()];
        let plan = MealPlanAgent::default().deterministic_fallback(&req);

        for meal in plan.days.iter().flat_map(|d| d.meals.iter()) {
            let entry = BREAKFASTS
                .iter()
                .chain(MAINS)
                .chain(SNACKS)
                .find(|m| m.name == meal.name)
                .unwrap();
            assert!(entry.vegan, "{} is not vegan", meal.name);
        }
    }

    #[test]
    fn test_parse_plan() {
        let raw = r#"{"days": [{"meals": [
            {"meal_type": "breakfast", "name": "Porridge", "calories": 500},
            {"meal_type": "dinner", "name": "Stew", "calories": 900}
        ]}, {"meals": []}]}"#;
        let plan = MealPlanAgent::default().try_parse(raw, &request(1, 2)).unwrap();

        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].day, 1);
        assert_eq!(plan.days[0].total_calories, 1400.0);
        assert_eq!(plan.average_daily_calories(), Some(1400.0));
    }

    #[test]
    fn test_confidence_of_fallback_is_high() {
        let agent = MealPlanAgent::default();
        let plan = agent.deterministic_fallback(&request(1, 3));
        assert!((agent.calculate_confidence(&plan, "") - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_validate_ranges() {
        let agent = MealPlanAgent::default();
        assert!(agent.validate_input(&request(7, 3)).is_ok());
        assert!(agent.validate_input(&request(15, 3)).is_err());
        assert!(agent.validate_input(&request(1, 1)).is_err());
    }
}
