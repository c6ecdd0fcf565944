//! Extraction of structured JSON from free-form model output.
//!
//! Models wrap their JSON in prose or fenced blocks more often than not.
//! These helpers are pure text handling, shared by every task agent and by
//! the consensus merge strategies (numeric fields arrive as numbers or as
//! strings like `"520 kcal"`).

use serde_json::Value;

/// Extract the first JSON value found in a model response.
///
/// Tried in order:
/// 1. ` ```json ` (or bare ` ``` `) fenced blocks
/// 2. The whole response as JSON
/// 3. The outermost `{...}` or `[...]` span
pub fn extract_json(response: &str) -> Option<Value> {
    let mut in_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            current_block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str::<Value>(&current_block) {
                return Some(parsed);
            }
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(response.trim())
        && (parsed.is_object() || parsed.is_array())
    {
        return Some(parsed);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(start) = response.find(open)
            && let Some(end) = response.rfind(close)
            && end > start
            && let Ok(parsed) = serde_json::from_str::<Value>(&response[start..=end])
        {
            return Some(parsed);
        }
    }

    None
}

/// Read a number from a JSON value, accepting numeric strings (`"12.5 g"`).
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

/// Read a numeric field from a JSON object.
pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(as_number).filter(|n| n.is_finite())
}

/// Read a non-empty string field from a JSON object.
pub fn string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Read a list of strings, accepting `{"name": ...}` objects as entries.
///
/// Entries are trimmed; case is preserved.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(_) => string_field(item, "name").map(str::to_string),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn leading_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}
