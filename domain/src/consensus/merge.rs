//! Per-task merge functions.
//!
//! Every function here is a pure function of the response set. Outputs
//! that are collections (ingredients, foods) are sorted so the merged
//! payload does not depend on response order.

use super::stats::{mean, median, population_std_dev, round_to};
use crate::agent::AgentResponse;
use crate::agent::parsing::{number_field, string_field, string_list};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// Numeric fields reconciled by the nutrition/profile strategy, in output order.
pub const NUMERIC_FIELDS: [&str; 7] = ["calories", "protein", "carbs", "fat", "fiber", "bmr", "tdee"];

/// Distance from the centre, in standard deviations, beyond which a value is dropped.
const OUTLIER_SIGMA: f64 = 2.0;

/// Merged payload plus the conflicts noticed while merging.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub merged: Value,
    pub disagreements: Vec<String>,
}

impl MergeOutcome {
    fn new(merged: Value, disagreements: Vec<String>) -> Self {
        Self {
            merged,
            disagreements,
        }
    }
}

// ==================== Recipe ====================

/// The recipe mapping inside a result: the result itself, or the first
/// element of a list.
fn recipe_of(result: &Value) -> Option<&Value> {
    match result {
        Value::Object(_) => Some(result),
        Value::Array(items) => items.first().filter(|first| first.is_object()),
        _ => None,
    }
}

pub fn merge_recipes(responses: &[&AgentResponse]) -> MergeOutcome {
    let recipes: Vec<&Value> = responses
        .iter()
        .filter_map(|r| recipe_of(r.result()))
        .collect();

    if recipes.is_empty() {
        return MergeOutcome::new(
            Value::Object(Map::new()),
            vec!["no recipes to merge".to_string()],
        );
    }

    let mut disagreements = Vec::new();

    // Most frequent title; equal counts resolve to the smallest title.
    let mut title_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for recipe in &recipes {
        if let Some(title) = string_field(recipe, "title") {
            *title_counts.entry(title).or_default() += 1;
        }
    }
    let title = title_counts
        .iter()
        .fold(None::<(&str, usize)>, |best, (&title, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((title, count)),
        })
        .map(|(title, _)| title);

    let ingredient_sets: Vec<BTreeSet<String>> = recipes
        .iter()
        .map(|recipe| string_list(recipe, "ingredients").into_iter().collect())
        .collect();
    let union: BTreeSet<&String> = ingredient_sets.iter().flatten().collect();
    let common: Vec<String> = ingredient_sets
        .first()
        .map(|first| {
            first
                .iter()
                .filter(|item| ingredient_sets[1..].iter().all(|set| set.contains(*item)))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if union.len() as f64 > common.len() as f64 * 1.5 {
        disagreements.push("significant disagreement on ingredients".to_string());
    }

    let prep_times: Vec<f64> = recipes
        .iter()
        .filter_map(|recipe| number_field(recipe, "prep_time"))
        .collect();
    let prep_time = mean(&prep_times).map(|m| m.round() as i64).unwrap_or(0);

    MergeOutcome::new(
        json!({
            "title": title,
            "ingredients": common,
            "prep_time": prep_time,
            "sources_count": recipes.len(),
        }),
        disagreements,
    )
}

// ==================== Food detection ====================

/// Foods listed in a result: `{"foods": [...]}` or a bare list.
fn foods_of(result: &Value) -> &[Value] {
    match result {
        Value::Array(items) => items.as_slice(),
        _ => result
            .get("foods")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
    }
}

#[derive(Default)]
struct FoodTally {
    quantities: Vec<f64>,
    responders: BTreeSet<usize>,
}

pub fn merge_food_detections(responses: &[&AgentResponse]) -> MergeOutcome {
    let mut tallies: BTreeMap<String, FoodTally> = BTreeMap::new();

    for (index, response) in responses.iter().enumerate() {
        for item in foods_of(response.result()) {
            let Some(name) = string_field(item, "name") else {
                continue;
            };
            let tally = tallies.entry(name.to_lowercase()).or_default();
            // An item without a quantity counts as one portion.
            tally
                .quantities
                .push(number_field(item, "quantity").unwrap_or(1.0));
            tally.responders.insert(index);
        }
    }

    let required = responses.len().min(2);
    let foods: Vec<Value> = tallies
        .iter()
        .filter(|(_, tally)| tally.responders.len() >= required)
        .map(|(name, tally)| {
            json!({
                "name": name,
                "quantity": round_to(mean(&tally.quantities).unwrap_or(0.0), 1),
                "detection_count": tally.quantities.len(),
            })
        })
        .collect();

    let mut disagreements = Vec::new();
    if tallies.len() > 2 * foods.len() {
        disagreements.push(format!(
            "strong disagreement: {} unique foods, {} in common",
            tallies.len(),
            foods.len()
        ));
    }

    MergeOutcome::new(json!({ "foods": foods }), disagreements)
}

// ==================== Nutrition / profile numbers ====================

/// Values within [`OUTLIER_SIGMA`] population standard deviations of the
/// median.
///
/// The median lies within one standard deviation of the mean, and so does
/// at least one value, so the result is never empty for non-empty input.
fn reject_outliers(values: &[f64]) -> Vec<f64> {
    let (Some(center), Some(spread)) = (median(values), population_std_dev(values)) else {
        return values.to_vec();
    };
    values
        .iter()
        .copied()
        .filter(|v| (v - center).abs() <= OUTLIER_SIGMA * spread)
        .collect()
}

pub fn merge_numeric_fields(responses: &[&AgentResponse]) -> MergeOutcome {
    let mut merged = Map::new();
    let mut disagreements = Vec::new();

    for field in NUMERIC_FIELDS {
        let values: Vec<f64> = responses
            .iter()
            .filter_map(|r| number_field(r.result(), field))
            .collect();
        if values.is_empty() {
            continue;
        }

        let value = if values.len() >= 3 {
            let kept = reject_outliers(&values);
            if kept.len() < values.len() {
                disagreements.push(format!("outliers on {}", field));
            }
            mean(&kept)
        } else {
            mean(&values)
        };

        if let Some(value) = value {
            merged.insert(field.to_string(), json!(round_to(value, 1)));
        }
    }

    MergeOutcome::new(Value::Object(merged), disagreements)
}

// ==================== Highest confidence ====================

/// The result of the most confident response; the earliest wins a tie.
pub fn highest_confidence(responses: &[&AgentResponse]) -> MergeOutcome {
    let best = responses.iter().fold(None::<&AgentResponse>, |best, r| match best {
        Some(b) if b.confidence() >= r.confidence() => Some(b),
        _ => Some(r),
    });

    MergeOutcome::new(
        best.map(|r| r.result().clone()).unwrap_or(Value::Null),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(result: Value, confidence: f64) -> AgentResponse {
        AgentResponse::new(result, confidence, "test-model").unwrap()
    }

    fn refs(responses: &[AgentResponse]) -> Vec<&AgentResponse> {
        responses.iter().collect()
    }

    #[test]
    fn test_recipe_ingredient_intersection() {
        let responses = vec![
            response(
                json!({"title": "Poulet riz", "ingredients": ["poulet", "riz", "carotte"], "prep_time": 30}),
                0.8,
            ),
            response(
                json!({"title": "Poulet riz", "ingredients": ["poulet", "riz", "brocoli"], "prep_time": 45}),
                0.8,
            ),
        ];
        let outcome = merge_recipes(&refs(&responses));

        assert_eq!(outcome.merged["ingredients"], json!(["poulet", "riz"]));
        assert_eq!(outcome.merged["title"], json!("Poulet riz"));
        assert_eq!(outcome.merged["prep_time"], json!(38));
        assert_eq!(outcome.merged["sources_count"], json!(2));
        // union 4 vs intersection 2: 4 > 3
        assert_eq!(
            outcome.disagreements,
            vec!["significant disagreement on ingredients"]
        );
    }

    #[test]
    fn test_recipe_majority_title_and_list_results() {
        let responses = vec![
            response(json!([{"title": "Curry", "ingredients": ["riz"]}]), 0.7),
            response(json!({"title": "Dahl", "ingredients": ["riz"]}), 0.7),
            response(json!({"title": "Curry", "ingredients": ["riz"]}), 0.7),
        ];
        let outcome = merge_recipes(&refs(&responses));

        assert_eq!(outcome.merged["title"], json!("Curry"));
        assert_eq!(outcome.merged["prep_time"], json!(0));
        assert!(outcome.disagreements.is_empty());
    }

    #[test]
    fn test_recipe_title_tie_takes_smallest_title() {
        let responses = vec![
            response(json!({"title": "Risotto", "ingredients": ["riz"]}), 0.7),
            response(json!({"title": "Paella", "ingredients": ["riz"]}), 0.7),
        ];
        let outcome = merge_recipes(&refs(&responses));
        assert_eq!(outcome.merged["title"], json!("Paella"));

        let reversed: Vec<_> = responses.into_iter().rev().collect();
        let outcome = merge_recipes(&refs(&reversed));
        assert_eq!(outcome.merged["title"], json!("Paella"));
    }

    #[test]
    fn test_recipe_ingredients_trimmed_but_case_sensitive() {
        let responses = vec![
            response(json!({"title": "Bol", "ingredients": [" riz", "Poulet"]}), 0.7),
            response(json!({"title": "Bol", "ingredients": ["riz ", "poulet"]}), 0.7),
        ];
        let outcome = merge_recipes(&refs(&responses));
        assert_eq!(outcome.merged["ingredients"], json!(["riz"]));
    }

    #[test]
    fn test_recipe_nothing_usable() {
        let responses = vec![response(json!("just text"), 0.7), response(json!([]), 0.7)];
        let outcome = merge_recipes(&refs(&responses));

        assert_eq!(outcome.merged, json!({}));
        assert_eq!(outcome.disagreements, vec!["no recipes to merge"]);
    }

    #[test]
    fn test_food_detection_keeps_shared_foods() {
        let responses = vec![
            response(
                json!({"foods": [{"name": "Rice", "quantity": 150}, {"name": "Chicken", "quantity": 100}]}),
                0.8,
            ),
            response(
                json!({"foods": [{"name": "rice", "quantity": 160}, {"name": "Salad", "quantity": 50}]}),
                0.8,
            ),
        ];
        let outcome = merge_food_detections(&refs(&responses));

        assert_eq!(
            outcome.merged,
            json!({"foods": [{"name": "rice", "quantity": 155.0, "detection_count": 2}]})
        );
        // 3 unique vs 1 shared: 3 > 2
        assert_eq!(
            outcome.disagreements,
            vec!["strong disagreement: 3 unique foods, 1 in common"]
        );
    }

    #[test]
    fn test_food_detection_single_response_keeps_everything() {
        let responses = vec![response(
            json!([{"name": "apple", "quantity": 1}, {"name": "banana"}]),
            0.8,
        )];
        let outcome = merge_food_detections(&refs(&responses));

        let foods = outcome.merged["foods"].as_array().unwrap();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[1]["quantity"], json!(1.0));
        assert!(outcome.disagreements.is_empty());
    }

    #[test]
    fn test_numeric_outlier_rejected() {
        let responses: Vec<_> = [500, 510, 520, 2000]
            .into_iter()
            .map(|c| response(json!({"calories": c, "protein": 30}), 0.8))
            .collect();
        let outcome = merge_numeric_fields(&refs(&responses));

        assert_eq!(outcome.merged["calories"], json!(510.0));
        assert_eq!(outcome.merged["protein"], json!(30.0));
        assert!(outcome.merged.get("fat").is_none());
        assert_eq!(outcome.disagreements, vec!["outliers on calories"]);
    }

    #[test]
    fn test_numeric_outliers_measured_from_median() {
        let cases: [(&[f64], f64); 3] = [
            (&[1.0, 1000.0, 1e6], 500.5),
            (&[0.0, 0.0, 1e9, 1e9, 5.0], 1.7),
            (&[400.0, 400.0, 400.0], 400.0),
        ];
        for (values, expected) in cases {
            let responses: Vec<_> = values
                .iter()
                .map(|c| response(json!({ "calories": c }), 0.8))
                .collect();
            let outcome = merge_numeric_fields(&refs(&responses));
            assert_eq!(outcome.merged["calories"], json!(expected), "{:?}", values);
        }
    }

    #[test]
    fn test_reject_outliers_never_empties_the_field() {
        let sets: [&[f64]; 4] = [
            &[1.0, 2.0, 1e12],
            &[-5.0, 5.0, -5.0, 5.0],
            &[0.0, 0.0, 0.0, 1e9, 1e9, 1e9, 7.0],
            &[3.0, 1e-9, 1e9],
        ];
        for values in sets {
            assert!(!reject_outliers(values).is_empty(), "{:?}", values);
        }
    }

    #[test]
    fn test_numeric_two_values_are_averaged() {
        let responses = vec![
            response(json!({"bmr": 1600, "tdee": "2480 kcal"}), 0.8),
            response(json!({"bmr": 1650.5}), 0.8),
        ];
        let outcome = merge_numeric_fields(&refs(&responses));

        assert_eq!(outcome.merged["bmr"], json!(1625.3));
        assert_eq!(outcome.merged["tdee"], json!(2480.0));
        assert!(outcome.disagreements.is_empty());
    }

    #[test]
    fn test_numeric_ignores_non_object_results() {
        let responses = vec![response(json!("420 kcal"), 0.8)];
        let outcome = merge_numeric_fields(&refs(&responses));
        assert_eq!(outcome.merged, json!({}));
    }

    #[test]
    fn test_highest_confidence_first_wins_tie() {
        let responses = vec![
            response(json!({"message": "a"}), 0.7),
            response(json!({"message": "b"}), 0.9),
            response(json!({"message": "c"}), 0.9),
        ];
        let outcome = highest_confidence(&refs(&responses));
        assert_eq!(outcome.merged, json!({"message": "b"}));
        assert!(outcome.disagreements.is_empty());
    }
}
