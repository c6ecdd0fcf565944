//! Nutrition coaching agent.
//!
//! Advice is free text, so unlike the other agents the parser accepts a
//! plain-prose reply as the message when no JSON is present.

use super::profile::Goal;
use crate::agent::parsing::{extract_json, string_field, string_list};
use crate::agent::{AgentConfig, Prompt, TaskAgent, TaskType};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You are a supportive nutrition coach. Answer the user's \
question using their intake for the day. Be specific and brief. Respond with JSON: \
{\"message\": string, \"tips\": [string]}.";

/// Daily water intake below which the fallback suggests drinking more.
const WATER_TARGET_ML: f64 = 2000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoachingRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub goal: Goal,
    #[serde(default)]
    pub calories_target: Option<f64>,
    #[serde(default)]
    pub calories_consumed: Option<f64>,
    #[serde(default)]
    pub protein_target: Option<f64>,
    #[serde(default)]
    pub protein_consumed: Option<f64>,
    #[serde(default)]
    pub water_ml: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingAdvice {
    pub message: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

impl CoachingAdvice {
    pub fn from_json(value: &Value) -> Option<Self> {
        let message = string_field(value, "message")
            .or_else(|| string_field(value, "advice"))?
            .trim()
            .to_string();
        if message.is_empty() {
            return None;
        }
        Some(Self {
            message,
            tips: string_list(value, "tips"),
        })
    }
}

pub struct CoachingAgent {
    config: AgentConfig,
}

impl CoachingAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

impl Default for CoachingAgent {
    fn default() -> Self {
        Self::new(AgentConfig::for_task(TaskType::Coaching))
    }
}

impl TaskAgent for CoachingAgent {
    type Input = CoachingRequest;
    type Output = CoachingAdvice;

    fn task_type(&self) -> TaskType {
        TaskType::Coaching
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn validate_input(&self, input: &CoachingRequest) -> Result<(), DomainError> {
        let amounts = [
            input.calories_target,
            input.calories_consumed,
            input.protein_target,
            input.protein_consumed,
            input.water_ml,
        ];
        if amounts.iter().flatten().any(|v| v.is_nan() || *v < 0.0) {
            return Err(DomainError::InvalidInput(
                "intake amounts must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    fn build_prompt(&self, input: &CoachingRequest) -> Prompt {
        let mut lines = vec![format!("Goal: {:?}", input.goal)];
        if let (Some(target), Some(consumed)) = (input.calories_target, input.calories_consumed) {
            lines.push(format!("Calories today: {} of {} kcal", consumed, target));
        }
        if let (Some(target), Some(consumed)) = (input.protein_target, input.protein_consumed) {
            lines.push(format!("Protein today: {} of {} g", consumed, target));
        }
        if let Some(water) = input.water_ml {
            lines.push(format!("Water today: {} ml", water));
        }
        lines.push(format!(
            "Question: {}",
            input
                .question
                .as_deref()
                .unwrap_or("How am I doing today?")
        ));
        Prompt::text(SYSTEM_PROMPT, lines.join("\n"))
    }

    fn try_parse(&self, raw: &str, _input: &CoachingRequest) -> Option<CoachingAdvice> {
        if let Some(advice) = extract_json(raw).and_then(|v| CoachingAdvice::from_json(&v)) {
            return Some(advice);
        }
        let text = raw.trim();
        if text.is_empty() || text.starts_with('{') || text.starts_with('[') {
            return None;
        }
        Some(CoachingAdvice {
            message: text.to_string(),
            tips: Vec::new(),
        })
    }

    fn calculate_confidence(&self, result: &CoachingAdvice, _raw: &str) -> f64 {
        let mut score: f64 = 0.5;
        let length = result.message.chars().count();
        if (40..=1200).contains(&length) {
            score += 0.2;
        } else if length < 15 {
            score -= 0.2;
        }
        if !result.tips.is_empty() {
            score += 0.15;
        }
        score.clamp(0.0, 1.0)
    }

    fn deterministic_fallback(&self, input: &CoachingRequest) -> CoachingAdvice {
        let mut tips = Vec::new();

        let message = match (input.calories_target, input.calories_consumed) {
            (Some(target), Some(consumed)) if target > 0.0 => {
                let remaining = target - consumed;
                if remaining > target * 0.1 {
                    tips.push(format!(
                        "Plan a balanced meal of around {:.0} kcal for the rest of the day.",
                        remaining
                    ));
                    format!("You have about {:.0} kcal left for today.", remaining)
                } else if remaining < -target * 0.1 {
                    tips.push("Favour vegetables and lean protein at your next meal.".to_string());
                    format!("You are about {:.0} kcal over today's target.", -remaining)
                } else {
                    "You are right on track with your calories today.".to_string()
                }
            }
            _ => "Keep logging your meals so advice can follow your intake.".to_string(),
        };

        if let (Some(target), Some(consumed)) = (input.protein_target, input.protein_consumed)
            && consumed < target * 0.8
        {
            tips.push(format!(
                "Add about {:.0} g of protein, e.g. yogurt, eggs, legumes or fish.",
                target - consumed
            ));
        }
        if input.water_ml.is_some_and(|w| w < WATER_TARGET_ML) {
            tips.push("Drink a few more glasses of water.".to_string());
        }
        match input.goal {
            Goal::LoseWeight => tips.push("Keep portions steady and avoid sugary drinks.".to_string()),
            Goal::GainMuscle => tips.push("Pair training days with a protein-rich meal.".to_string()),
            Goal::Maintain => {}
        }

        CoachingAdvice { message, tips }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_advice() {
        let agent = CoachingAgent::default();
        let advice = agent
            .try_parse(
                r#"{"message": "Great job today.", "tips": ["Drink water"]}"#,
                &CoachingRequest::default(),
            )
            .unwrap();
        assert_eq!(advice.message, "Great job today.");
        assert_eq!(advice.tips, vec!["Drink water"]);
    }

    #[test]
    fn test_parse_plain_text_advice() {
        let agent = CoachingAgent::default();
        let advice = agent
            .try_parse("  Eat more greens at dinner.  ", &CoachingRequest::default())
            .unwrap();
        assert_eq!(advice.message, "Eat more greens at dinner.");
        assert!(advice.tips.is_empty());

        assert!(agent.try_parse("   ", &CoachingRequest::default()).is_none());
        assert!(agent.try_parse(r#"{"tips": []}"#, &CoachingRequest::default()).is_none());
    }

    #[test]
    fn test_fallback_calories_left() {
        let request = CoachingRequest {
            calories_target: Some(2000.0),
            calories_consumed: Some(1200.0),
            protein_target: Some(120.0),
            protein_consumed: Some(60.0),
            water_ml: Some(800.0),
            ..Default::default()
        };
        let advice = CoachingAgent::default().deterministic_fallback(&request);

        assert_eq!(advice.message, "You have about 800 kcal left for today.");
        assert_eq!(advice.tips.len(), 3);
        assert!(advice.tips[1].contains("60 g of protein"));
    }

    #[test]
    fn test_fallback_over_target() {
        let request = CoachingRequest {
            goal: Goal::LoseWeight,
            calories_target: Some(1800.0),
            calories_consumed: Some(2300.0),
            ..Default::default()
        };
        let advice = CoachingAgent::default().deterministic_fallback(&request);
        assert!(advice.message.contains("500 kcal over"));
    }

    #[test]
    fn test_fallback_without_intake() {
        let advice = CoachingAgent::default().deterministic_fallback(&CoachingRequest::default());
        assert!(advice.message.contains("Keep logging"));
        assert!(advice.tips.is_empty());
    }

    #[test]
    fn test_validate_rejects_negative() {
        let request = CoachingRequest {
            water_ml: Some(-1.0),
            ..Default::default()
        };
        assert!(CoachingAgent::default().validate_input(&request).is_err());
    }
}
