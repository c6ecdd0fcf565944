//! Console output formatter for consensus results

use colored::Colorize;
use nutri_application::TaskOutcome;
use nutri_domain::{AgentResponse, ConsensusResult};
use serde::Serialize;
use serde_json::Value;

/// Formats task outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a complete task outcome: per-model responses, then consensus
    pub fn format_outcome(outcome: &TaskOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!(
            "{} ({})",
            outcome.task_type, outcome.level
        )));
        output.push('\n');

        output.push_str(&Self::section_header("Responses"));
        if outcome.responses.is_empty() {
            output.push_str(&format!("{}\n", "No model answered".red()));
        }
        for response in &outcome.responses {
            output.push_str(&Self::format_response_line(response));
        }

        output.push_str(&Self::format_consensus(&outcome.consensus));
        output
    }

    /// Format a consensus result on its own
    pub fn format_consensus(consensus: &ConsensusResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::section_header("Consensus"));
        let summary = consensus.summary();
        if consensus.is_valid {
            output.push_str(&format!("{}\n", summary.green().bold()));
        } else {
            output.push_str(&format!("{}\n", summary.yellow().bold()));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Strategy:".cyan().bold(),
            consensus.strategy.as_str()
        ));
        if !consensus.models.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Models:".cyan().bold(),
                consensus.models.join(", ")
            ));
        }

        if !consensus.warnings.is_empty() {
            output.push_str(&format!("\n{}\n", "Warnings:".yellow().bold()));
            for warning in &consensus.warnings {
                output.push_str(&format!("  * {}\n", warning));
            }
        }

        if !consensus.disagreements.is_empty() {
            output.push_str(&format!("\n{}\n", "Disagreements:".yellow().bold()));
            for disagreement in &consensus.disagreements {
                output.push_str(&format!("  * {}\n", disagreement));
            }
        }

        output.push_str(&format!("\n{}\n", "Merged result:".cyan().bold()));
        match &consensus.merged_result {
            Some(value) if consensus.has_merged_result() => {
                output.push_str(&Self::pretty(value));
                output.push('\n');
            }
            _ => output.push_str(&format!("{}\n", "(none)".dimmed())),
        }

        output
    }

    /// Format a single agent response (used by the `fallback` command)
    pub fn format_response(response: &AgentResponse) -> String {
        let mut output = Self::format_response_line(response);
        if !response.reasoning().is_empty() {
            output.push_str(&format!("{} {}\n", "Reasoning:".dimmed(), response.reasoning()));
        }
        output.push('\n');
        output.push_str(&Self::pretty(response.result()));
        output.push('\n');
        output
    }

    /// Only the merged result, or `null` when there is none
    pub fn format_result_only(consensus: &ConsensusResult) -> String {
        match &consensus.merged_result {
            Some(value) => Self::pretty(value),
            None => "null".to_string(),
        }
    }

    /// Format any serializable value as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_response_line(response: &AgentResponse) -> String {
        let marker = if response.used_fallback() {
            " (fallback)".yellow().to_string()
        } else {
            String::new()
        };
        format!(
            "  {} {:<24} confidence {:.2}{}\n",
            "*".cyan(),
            response.model_used(),
            response.confidence(),
            marker
        )
    }

    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutri_domain::{ConsensusLevel, ConsensusValidator, TaskType};
    use serde_json::json;

    fn responses() -> Vec<AgentResponse> {
        vec![
            AgentResponse::new(json!({"calories": 500.0}), 0.9, "gpt-4o").unwrap(),
            AgentResponse::new(json!({"calories": 520.0}), 0.8, "claude-sonnet-4.5").unwrap(),
        ]
    }

    fn outcome() -> TaskOutcome {
        let responses = responses();
        let consensus =
            ConsensusValidator::new(0.6).validate(&responses, TaskType::NutritionValidation, 2);
        TaskOutcome {
            task_type: TaskType::NutritionValidation,
            level: ConsensusLevel::Ensemble,
            responses,
            consensus,
        }
    }

    #[test]
    fn test_format_outcome_lists_models_and_result() {
        let text = ConsoleFormatter::format_outcome(&outcome());

        assert!(text.contains("nutrition_validation"));
        assert!(text.contains("gpt-4o"));
        assert!(text.contains("claude-sonnet-4.5"));
        assert!(text.contains("\"calories\": 510.0"));
    }

    #[test]
    fn test_format_consensus_without_merged_result() {
        let consensus = ConsensusValidator::new(0.6).validate(&[], TaskType::Coaching, 1);
        let text = ConsoleFormatter::format_consensus(&consensus);

        assert!(text.contains("invalid"));
        assert!(text.contains("no responses to validate"));
        assert!(text.contains("(none)"));
    }

    #[test]
    fn test_format_result_only() {
        let outcome = outcome();
        let text = ConsoleFormatter::format_result_only(&outcome.consensus);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["calories"], json!(510.0));

        let empty = ConsensusValidator::new(0.6).validate(&[], TaskType::Coaching, 1);
        assert_eq!(ConsoleFormatter::format_result_only(&empty), "null");
    }

    #[test]
    fn test_format_json_outcome() {
        let text = ConsoleFormatter::format_json(&outcome());
        let parsed: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed["task_type"], json!("nutrition_validation"));
        assert_eq!(parsed["level"], json!("ensemble"));
        assert_eq!(parsed["responses"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["consensus"]["is_valid"], json!(true));
    }

    #[test]
    fn test_format_fallback_response() {
        let response = AgentResponse::deterministic(json!({"tips": []}), "rule-based advice");
        let text = ConsoleFormatter::format_response(&response);

        assert!(text.contains("deterministic"));
        assert!(text.contains("rule-based advice"));
        assert!(text.contains("\"tips\""));
    }
}
