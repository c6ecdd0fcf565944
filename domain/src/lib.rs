//! Domain layer for nutri-quorum
//!
//! This crate contains the agent contract, the per-task agents and the
//! consensus validator. It performs no I/O and has no dependencies on
//! infrastructure or CLI concerns.
//!
//! # Core Concepts
//!
//! ## Agents
//!
//! One [`TaskAgent`] per [`TaskType`]. An agent builds a [`Prompt`], parses
//! the model's raw text, scores its own confidence and, when no model
//! answer is good enough, produces a deterministic rule-based result.
//!
//! ## Consensus
//!
//! [`ConsensusValidator`] reconciles several [`AgentResponse`]s for the same
//! task into one [`ConsensusResult`]: a merged result, an agreement score,
//! a global confidence and warnings.
//!
//! ## Solo / Ensemble (ConsensusLevel)
//!
//! - **Solo**: one model, validated alone
//! - **Ensemble** (default): fan out to several models, then validate

pub mod agent;
pub mod consensus;
pub mod core;
pub mod orchestration;
pub mod tasks;

// Re-export commonly used types
pub use agent::{AgentConfig, AgentResponse, ImageSource, Prompt, TaskAgent, TaskType};
pub use consensus::{ConsensusResult, ConsensusValidator, MergeStrategy};
pub use core::{error::DomainError, model::Model};
pub use orchestration::ConsensusLevel;
pub use tasks::{
    CoachingAgent, FoodDetectionAgent, MealPlanAgent, NutritionAgent, ProfileAgent, RecipeAgent,
};
