//! Food detection from a meal photo (vision prompt).

use crate::agent::parsing::{extract_json, number_field, string_field};
use crate::agent::{AgentConfig, ImageSource, Prompt, TaskAgent, TaskType};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You identify foods in meal photos. List every distinct \
food you can see with an estimated quantity. Respond with JSON only: \
{\"foods\": [{\"name\": string, \"quantity\": number, \"unit\": \"g\" | \"ml\" | \"portion\", \
\"confidence\": 0-1}]}.";

/// More distinct foods than this on one plate is treated as hallucination.
const PLAUSIBLE_FOOD_COUNT: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodImageRequest {
    /// `http(s)://` or `data:image/...;base64,` URL
    pub image_url: String,
    /// Free-text description from the user, e.g. "rice, chicken and salad"
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFood {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDetection {
    pub foods: Vec<DetectedFood>,
}

impl FoodDetection {
    /// Read detections from `{"foods": [...]}` or a bare list.
    pub fn from_json(value: &Value) -> Option<Self> {
        let items = match value {
            Value::Array(items) => items,
            _ => value.get("foods")?.as_array()?,
        };
        let foods = items
            .iter()
            .filter_map(|item| {
                Some(DetectedFood {
                    name: string_field(item, "name")?.to_string(),
                    quantity: number_field(item, "quantity").unwrap_or(1.0),
                    unit: string_field(item, "unit").unwrap_or("portion").to_string(),
                    confidence: number_field(item, "confidence").map(|c| c.clamp(0.0, 1.0)),
                })
            })
            .collect();
        Some(Self { foods })
    }
}

pub struct FoodDetectionAgent {
    config: AgentConfig,
}

impl FoodDetectionAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

impl Default for FoodDetectionAgent {
    fn default() -> Self {
        Self::new(AgentConfig::for_task(TaskType::FoodDetection))
    }
}

impl TaskAgent for FoodDetectionAgent {
    type Input = FoodImageRequest;
    type Output = FoodDetection;

    fn task_type(&self) -> TaskType {
        TaskType::FoodDetection
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn validate_input(&self, input: &FoodImageRequest) -> Result<(), DomainError> {
        let url = input.image_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:image/")
        {
            Ok(())
        } else {
            Err(DomainError::InvalidInput(format!(
                "unsupported image url: {}",
                input.image_url
            )))
        }
    }

    fn build_prompt(&self, input: &FoodImageRequest) -> Prompt {
        let mut user = String::from("Which foods are on this plate, and how much of each?");
        if let Some(meal_type) = &input.meal_type {
            user.push_str(&format!(" The meal is a {}.", meal_type));
        }
        if let Some(hint) = &input.hint {
            user.push_str(&format!(" The user describes it as: \"{}\".", hint));
        }
        Prompt::vision(SYSTEM_PROMPT, user, ImageSource::new(input.image_url.trim()))
    }

    fn try_parse(&self, raw: &str, _input: &FoodImageRequest) -> Option<FoodDetection> {
        FoodDetection::from_json(&extract_json(raw)?)
    }

    fn calculate_confidence(&self, result: &FoodDetection, _raw: &str) -> f64 {
        if result.foods.is_empty() {
            return 0.3;
        }
        let stated: Vec<f64> = result.foods.iter().filter_map(|f| f.confidence).collect();
        let mut score = if stated.is_empty() {
            0.65
        } else {
            stated.iter().sum::<f64>() / stated.len() as f64
        };
        if result.foods.len() > PLAUSIBLE_FOOD_COUNT {
            score -= 0.2;
        }
        if result.foods.iter().any(|f| f.quantity <= 0.0) {
            score -= 0.1;
        }
        score.clamp(0.0, 1.0)
    }

    fn deterministic_fallback(&self, input: &FoodImageRequest) -> FoodDetection {
        let foods = input
            .hint
            .as_deref()
            .unwrap_or_default()
            .split([',', ';', '+'])
            .flat_map(|part| part.split(" and "))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| DetectedFood {
                name: name.to_lowercase(),
                quantity: 1.0,
                unit: "portion".to_string(),
                confidence: None,
            })
            .collect();
        FoodDetection { foods }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(hint: Option<&str>) -> FoodImageRequest {
        FoodImageRequest {
            image_url: "https://cdn.example.com/meal.jpg".to_string(),
            hint: hint.map(str::to_string),
            meal_type: Some("lunch".to_string()),
        }
    }

    #[test]
    fn test_prompt_is_vision() {
        let prompt = FoodDetectionAgent::default().build_prompt(&request(Some("rice bowl")));
        assert_eq!(prompt.image().unwrap().url, "https://cdn.example.com/meal.jpg");
        assert!(prompt.user().contains("lunch"));
        assert!(prompt.user().contains("rice bowl"));
    }

    #[test]
    fn test_parse_foods() {
        let raw = r#"{"foods": [{"name": "Rice", "quantity": 150, "unit": "g", "confidence": 0.9},
                                {"name": "Chicken", "quantity": "120 g", "confidence": 0.7},
                                {"quantity": 3}]}"#;
        let agent = FoodDetectionAgent::default();
        let detection = agent.try_parse(raw, &request(None)).unwrap();

        assert_eq!(detection.foods.len(), 2);
        assert_eq!(detection.foods[1].quantity, 120.0);
        assert_eq!(detection.foods[1].unit, "portion");
        assert!((agent.calculate_confidence(&detection, raw) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_detection_is_low_confidence() {
        let agent = FoodDetectionAgent::default();
        let detection = agent.try_parse(r#"{"foods": []}"#, &request(None)).unwrap();
        assert_eq!(agent.calculate_confidence(&detection, ""), 0.3);
    }

    #[test]
    fn test_fallback_uses_hint() {
        let agent = FoodDetectionAgent::default();
        let detection = agent.deterministic_fallback(&request(Some("Rice, chicken and salad")));
        let names: Vec<_> = detection.foods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["rice", "chicken", "salad"]);

        assert!(agent.deterministic_fallback(&request(None)).foods.is_empty());
    }

    #[test]
    fn test_validate_image_url() {
        let agent = FoodDetectionAgent::default();
        assert!(agent.validate_input(&request(None)).is_ok());
        let bad = FoodImageRequest {
            image_url: "/tmp/meal.jpg".to_string(),
            ..request(None)
        };
        assert!(agent.validate_input(&bad).is_err());
    }
}
