//! Task-specific agents.
//!
//! One agent per [`TaskType`](crate::TaskType). Each supplies its prompt,
//! parser, confidence heuristic and rule-based fallback; none of them
//! performs I/O.
//!
//! | Agent | Task | Fallback |
//! |-------|------|----------|
//! | [`RecipeAgent`] | recipe_generation | template recipe from the pantry |
//! | [`FoodDetectionAgent`] | food_detection | foods named in the caller's hint |
//! | [`NutritionAgent`] | nutrition_validation | per-100 g reference table |
//! | [`ProfileAgent`] | profile_analysis | Mifflin–St Jeor + activity factor |
//! | [`MealPlanAgent`] | meal_plan_generation | calorie split over a meal catalog |
//! | [`CoachingAgent`] | coaching | rules on intake vs. target |

pub mod coaching;
pub mod food_detection;
pub mod meal_plan;
pub mod nutrition;
pub mod profile;
pub mod recipe;

pub use coaching::{CoachingAdvice, CoachingAgent, CoachingRequest};
pub use food_detection::{DetectedFood, FoodDetection, FoodDetectionAgent, FoodImageRequest};
pub use meal_plan::{DayPlan, MealPlan, MealPlanAgent, MealPlanRequest, PlannedMeal};
pub use nutrition::{FoodPortion, NutritionAgent, NutritionEstimate, NutritionRequest};
pub use profile::{ActivityLevel, Goal, ProfileAgent, ProfileAnalysis, Sex, UserProfile};
pub use recipe::{Recipe, RecipeAgent, RecipeRequest};

/// Energy implied by macronutrients (4/4/9 kcal per gram).
pub(crate) fn atwater_kcal(protein: f64, carbs: f64, fat: f64) -> f64 {
    protein * 4.0 + carbs * 4.0 + fat * 9.0
}

/// Relative gap between stated calories and the macro-derived energy.
pub(crate) fn atwater_gap(calories: f64, protein: f64, carbs: f64, fat: f64) -> Option<f64> {
    (calories > 0.0).then(|| (atwater_kcal(protein, carbs, fat) - calories).abs() / calories)
}
