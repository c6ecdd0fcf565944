//! Consensus settings: orchestration control.
//!
//! [`ConsensusSettings`] groups the parameters that control how
//! [`ProcessTaskUseCase`](crate::use_cases::process_task::ProcessTaskUseCase)
//! collects and validates responses. These are application-layer concerns;
//! per-agent model lists live in [`AgentConfigs`](super::AgentConfigs).

use nutri_domain::consensus::{DEFAULT_MIN_AGREEMENT, DEFAULT_MIN_CONFIDENCE};
use nutri_domain::{ConsensusLevel, ConsensusValidator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusSettings {
    /// Solo (one model) or Ensemble (fan-out).
    pub level: ConsensusLevel,
    /// Confidence a response needs to pass the consensus filter.
    pub min_confidence: f64,
    /// Responses that must pass the filter for a valid consensus.
    pub min_agreement: usize,
    /// Outer bound on a whole `process_task` call.
    pub task_timeout: Option<Duration>,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        Self {
            level: ConsensusLevel::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_agreement: DEFAULT_MIN_AGREEMENT,
            task_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl ConsensusSettings {
    // ==================== Builder Methods ====================

    pub fn with_level(mut self, level: ConsensusLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_min_agreement(mut self, min_agreement: usize) -> Self {
        self.min_agreement = min_agreement;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Validator configured from these settings
    pub fn validator(&self) -> ConsensusValidator {
        ConsensusValidator::new(self.min_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let settings = ConsensusSettings::default();
        assert_eq!(settings.level, ConsensusLevel::Ensemble);
        assert_eq!(settings.min_confidence, 0.6);
        assert_eq!(settings.min_agreement, 2);
        assert_eq!(settings.task_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_builder_and_validator() {
        let settings = ConsensusSettings::default()
            .with_level(ConsensusLevel::Solo)
            .with_min_confidence(0.7)
            .with_task_timeout(None);

        let validator = settings.validator();
        assert_eq!(validator.min_confidence(), 0.7);
        assert!(settings.task_timeout.is_none());
    }
}
