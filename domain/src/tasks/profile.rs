//! User profile analysis: energy needs and macro targets.

use super::atwater_gap;
use crate::agent::parsing::{extract_json, number_field, string_list};
use crate::agent::{AgentConfig, Prompt, TaskAgent, TaskType};
use crate::consensus::stats::round_to;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a sports dietitian. From the user profile, compute \
basal metabolic rate, total daily energy expenditure, a daily calorie target for the \
goal and macro targets. Respond with JSON only: {\"bmr\": kcal, \"tdee\": kcal, \
\"calories\": kcal, \"protein\": g, \"carbs\": g, \"fat\": g, \"fiber\": g, \
\"recommendations\": [string]}.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    #[default]
    Maintain,
    GainMuscle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: Goal,
}

impl UserProfile {
    /// Mifflin–St Jeor basal metabolic rate, kcal/day
    pub fn mifflin_st_jeor(&self) -> f64 {
        let base = 10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * self.age as f64;
        match self.sex {
            Sex::Male => base + 5.0,
            Sex::Female => base - 161.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAnalysis {
    pub bmr: f64,
    pub tdee: f64,
    /// Daily calorie target for the goal
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub recommendations: Vec<String>,
}

impl ProfileAnalysis {
    /// Read an analysis from model JSON. BMR and TDEE are required; the
    /// calorie target defaults to TDEE.
    pub fn from_json(value: &Value) -> Option<Self> {
        let bmr = number_field(value, "bmr")?;
        let tdee = number_field(value, "tdee")?;
        Some(Self {
            bmr,
            tdee,
            calories: number_field(value, "calories").unwrap_or(tdee),
            protein: number_field(value, "protein").unwrap_or(0.0),
            carbs: number_field(value, "carbs").unwrap_or(0.0),
            fat: number_field(value, "fat").unwrap_or(0.0),
            fiber: number_field(value, "fiber").unwrap_or(0.0),
            recommendations: string_list(value, "recommendations"),
        })
    }
}

pub struct ProfileAgent {
    config: AgentConfig,
}

impl ProfileAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

impl Default for ProfileAgent {
    fn default() -> Self {
        Self::new(AgentConfig::for_task(TaskType::ProfileAnalysis))
    }
}

impl TaskAgent for ProfileAgent {
    type Input = UserProfile;
    type Output = ProfileAnalysis;

    fn task_type(&self) -> TaskType {
        TaskType::ProfileAnalysis
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn validate_input(&self, input: &UserProfile) -> Result<(), DomainError> {
        if !(10..=120).contains(&input.age) {
            return Err(DomainError::InvalidInput(format!("age out of range: {}", input.age)));
        }
        if !(20.0..=400.0).contains(&input.weight_kg) {
            return Err(DomainError::InvalidInput(format!(
                "weight out of range: {} kg",
                input.weight_kg
            )));
        }
        if !(100.0..=250.0).contains(&input.height_cm) {
            return Err(DomainError::InvalidInput(format!(
                "height out of range: {} cm",
                input.height_cm
            )));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &UserProfile) -> Prompt {
        let user = format!(
            "Age: {}\nSex: {:?}\nWeight: {} kg\nHeight: {} cm\nActivity level: {:?}\nGoal: {:?}",
            input.age, input.sex, input.weight_kg, input.height_cm, input.activity_level, input.goal
        );
        Prompt::text(SYSTEM_PROMPT, user)
    }

    fn try_parse(&self, raw: &str, _input: &UserProfile) -> Option<ProfileAnalysis> {
        ProfileAnalysis::from_json(&extract_json(raw)?)
    }

    fn calculate_confidence(&self, result: &ProfileAnalysis, _raw: &str) -> f64 {
        let mut score = 0.15;
        if (900.0..=3500.0).contains(&result.bmr) {
            score += 0.2;
        }
        if result.bmr > 0.0 && (1.15..=2.0).contains(&(result.tdee / result.bmr)) {
            score += 0.3;
        }
        if atwater_gap(result.calories, result.protein, result.carbs, result.fat)
            .is_some_and(|gap| gap <= 0.15)
        {
            score += 0.2;
        }
        if !result.recommendations.is_empty() {
            score += 0.1;
        }
        f64::min(score, 1.0)
    }

    fn deterministic_fallback(&self, input: &UserProfile) -> ProfileAnalysis {
        let bmr = input.mifflin_st_jeor();
        let tdee = bmr * input.activity_level.factor();
        let floor = match input.sex {
            Sex::Male => 1500.0,
            Sex::Female => 1200.0,
        };
        let calories = match input.goal {
            Goal::LoseWeight => (tdee - 500.0).max(floor),
            Goal::Maintain => tdee,
            Goal::GainMuscle => tdee + 300.0,
        };
        let protein_per_kg = match input.goal {
            Goal::LoseWeight => 1.8,
            Goal::Maintain => 1.6,
            Goal::GainMuscle => 2.0,
        };
        let protein = protein_per_kg * input.weight_kg;
        let fat = calories * 0.25 / 9.0;
        let carbs = ((calories - protein * 4.0 - fat * 9.0) / 4.0).max(0.0);
        let fiber = calories / 1000.0 * 14.0;

        let mut recommendations = vec![match input.goal {
            Goal::LoseWeight => {
                "Aim for a steady loss of about 0.5 kg per week; keep protein high to preserve muscle."
            }
            Goal::Maintain => "Keep intake close to your daily energy expenditure.",
            Goal::GainMuscle => {
                "Eat a modest surplus and spread protein over 3-4 meals around training."
            }
        }
        .to_string()];
        if matches!(input.activity_level, ActivityLevel::Sedentary) {
            recommendations.push("Add daily walking to raise energy expenditure.".to_string());
        }

        ProfileAnalysis {
            bmr: round_to(bmr, 0),
            tdee: round_to(tdee, 0),
            calories: round_to(calories, 0),
            protein: round_to(protein, 1),
            carbs: round_to(carbs, 1),
            fat: round_to(fat, 1),
            fiber: round_to(fiber, 1),
            recommendations,
        }
    }
}
