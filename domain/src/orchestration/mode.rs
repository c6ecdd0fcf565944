//! Consensus level definitions.
//!
//! Defines [`ConsensusLevel`], which decides how many models answer a task:
//! - Solo: one model, validated on its own
//! - Ensemble: fan out to several models and validate their agreement
//!
//! Inspired by Cassandra's ConsistencyLevel:
//! - `ConsistencyLevel::ONE` → `ConsensusLevel::Solo`
//! - `ConsistencyLevel::QUORUM` → `ConsensusLevel::Ensemble`

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consensus level for a task run.
///
/// # Solo vs Ensemble
///
/// - **Solo**: A single `process` call (with its own fallback chain).
///   Consensus runs with a minimum agreement of one, so a lone answer
///   can still be valid.
///
/// - **Ensemble** (default): The task fans out to up to `max_fan_out`
///   models concurrently and the responses are merged by the task's
///   strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusLevel {
    Solo,
    #[default]
    Ensemble,
}

impl ConsensusLevel {
    /// Minimum agreement to use when validating at this level.
    pub fn effective_min_agreement(&self, configured: usize) -> usize {
        match self {
            ConsensusLevel::Solo => 1,
            ConsensusLevel::Ensemble => configured,
        }
    }

    /// One-line summary for configuration output.
    pub fn description(&self) -> &'static str {
        match self {
            ConsensusLevel::Solo => "Solo: one model with deterministic fallback",
            ConsensusLevel::Ensemble => "Ensemble: multi-model fan-out + consensus",
        }
    }
}

impl fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusLevel::Solo => write!(f, "solo"),
            ConsensusLevel::Ensemble => write!(f, "ensemble"),
        }
    }
}

impl std::str::FromStr for ConsensusLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solo" | "s" => Ok(ConsensusLevel::Solo),
            "ensemble" | "ens" | "e" => Ok(ConsensusLevel::Ensemble),
            _ => Err(DomainError::InvalidConsensusLevel(s.to_string())),
        }
    }
}
