//! Process Task use case
//!
//! The orchestrator: maps a task type to its agent, collects responses
//! (one model in Solo, a fan-out in Ensemble) and validates them.

use crate::config::{AgentConfigs, ConsensusSettings};
use crate::ports::consensus_logger::{ConsensusEvent, ConsensusLogger, NoConsensusLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::agent_runner::{AgentError, AgentRunner};
use nutri_domain::{
    AgentResponse, CoachingAgent, ConsensusLevel, ConsensusResult, ConsensusValidator,
    DomainError, FoodDetectionAgent, MealPlanAgent, Model, NutritionAgent, ProfileAgent,
    RecipeAgent, TaskAgent, TaskType,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that can occur while processing a task
#[derive(Error, Debug)]
pub enum ProcessTaskError {
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Task timed out after {0:?}")]
    Timeout(Duration),

    #[error("Task cancelled")]
    Cancelled,
}

impl From<DomainError> for ProcessTaskError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::UnknownTaskType(tag) => ProcessTaskError::UnknownTaskType(tag),
            other => ProcessTaskError::InvalidInput(other.to_string()),
        }
    }
}

/// Input for the ProcessTask use case
#[derive(Debug, Clone)]
pub struct ProcessTaskInput {
    pub task: TaskType,
    /// Task input as JSON; deserialized into the agent's input type
    pub input: Value,
    /// Models to use instead of the agent's primary list
    pub models: Option<Vec<Model>>,
    /// Overrides the configured consensus level
    pub level: Option<ConsensusLevel>,
    /// Overrides the configured minimum agreement
    pub min_agreement: Option<usize>,
}

impl ProcessTaskInput {
    pub fn new(task: TaskType, input: Value) -> Self {
        Self {
            task,
            input,
            models: None,
            level: None,
            min_agreement: None,
        }
    }

    pub fn with_models(mut self, models: Vec<Model>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn with_level(mut self, level: ConsensusLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_min_agreement(mut self, min_agreement: usize) -> Self {
        self.min_agreement = Some(min_agreement);
        self
    }
}

/// Collected responses and their consensus
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub task_type: TaskType,
    pub level: ConsensusLevel,
    pub responses: Vec<AgentResponse>,
    pub consensus: ConsensusResult,
}

/// Use case for processing one task end to end
pub struct ProcessTaskUseCase<G: LlmGateway + 'static> {
    recipe: AgentRunner<RecipeAgent, G>,
    food_detection: AgentRunner<FoodDetectionAgent, G>,
    nutrition: AgentRunner<NutritionAgent, G>,
    profile: AgentRunner<ProfileAgent, G>,
    meal_plan: AgentRunner<MealPlanAgent, G>,
    coaching: AgentRunner<CoachingAgent, G>,
    validator: ConsensusValidator,
    settings: ConsensusSettings,
    logger: Arc<dyn ConsensusLogger>,
    progress: Arc<dyn ProgressNotifier>,
}

impl<G: LlmGateway + 'static> ProcessTaskUseCase<G> {
    pub fn new(gateway: Arc<G>, settings: ConsensusSettings, agents: AgentConfigs) -> Self {
        Self {
            recipe: AgentRunner::new(RecipeAgent::new(agents.recipe_generation), Arc::clone(&gateway)),
            food_detection: AgentRunner::new(
                FoodDetectionAgent::new(agents.food_detection),
                Arc::clone(&gateway),
            ),
            nutrition: AgentRunner::new(
                NutritionAgent::new(agents.nutrition_validation),
                Arc::clone(&gateway),
            ),
            profile: AgentRunner::new(ProfileAgent::new(agents.profile_analysis), Arc::clone(&gateway)),
            meal_plan: AgentRunner::new(
                MealPlanAgent::new(agents.meal_plan_generation),
                Arc::clone(&gateway),
            ),
            coaching: AgentRunner::new(CoachingAgent::new(agents.coaching), gateway),
            validator: settings.validator(),
            settings,
            logger: Arc::new(NoConsensusLogger),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConsensusLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &ConsensusSettings {
        &self.settings
    }

    /// Process a task with the configured level and models
    pub async fn process_task(
        &self,
        task: TaskType,
        input: Value,
    ) -> Result<TaskOutcome, ProcessTaskError> {
        self.execute(ProcessTaskInput::new(task, input)).await
    }

    /// Process a task named by its string tag
    pub async fn process_task_tag(
        &self,
        task_tag: &str,
        input: Value,
    ) -> Result<TaskOutcome, ProcessTaskError> {
        let task = task_tag.parse::<TaskType>()?;
        self.process_task(task, input).await
    }

    /// Execute the use case without external cancellation
    pub async fn execute(&self, input: ProcessTaskInput) -> Result<TaskOutcome, ProcessTaskError> {
        self.execute_with_cancellation(input, &CancellationToken::new())
            .await
    }

    /// Execute the use case, bounded by the configured timeout and `cancel`.
    ///
    /// A timeout or cancellation is a hard error: no partial consensus is
    /// returned.
    pub async fn execute_with_cancellation(
        &self,
        input: ProcessTaskInput,
        cancel: &CancellationToken,
    ) -> Result<TaskOutcome, ProcessTaskError> {
        let bounded = async {
            match self.settings.task_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.run(&input)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("{} timed out after {:?}", input.task, limit);
                        Err(ProcessTaskError::Timeout(limit))
                    }
                },
                None => self.run(&input).await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("{} cancelled", input.task);
                Err(ProcessTaskError::Cancelled)
            }
            result = bounded => result,
        }
    }

    /// Deterministic result for a task, with no model call
    pub fn deterministic(
        &self,
        task: TaskType,
        input: Value,
    ) -> Result<AgentResponse, ProcessTaskError> {
        match task {
            TaskType::RecipeGeneration => Self::deterministic_with(&self.recipe, input),
            TaskType::FoodDetection => Self::deterministic_with(&self.food_detection, input),
            TaskType::NutritionValidation => Self::deterministic_with(&self.nutrition, input),
            TaskType::ProfileAnalysis => Self::deterministic_with(&self.profile, input),
            TaskType::MealPlanGeneration => Self::deterministic_with(&self.meal_plan, input),
            TaskType::Coaching => Self::deterministic_with(&self.coaching, input),
        }
    }

    async fn run(&self, input: &ProcessTaskInput) -> Result<TaskOutcome, ProcessTaskError> {
        let level = input.level.unwrap_or(self.settings.level);
        info!("Processing {} ({})", input.task, level);

        let responses = match input.task {
            TaskType::RecipeGeneration => self.collect(&self.recipe, input, level).await?,
            TaskType::FoodDetection => self.collect(&self.food_detection, input, level).await?,
            TaskType::NutritionValidation => self.collect(&self.nutrition, input, level).await?,
            TaskType::ProfileAnalysis => self.collect(&self.profile, input, level).await?,
            TaskType::MealPlanGeneration => self.collect(&self.meal_plan, input, level).await?,
            TaskType::Coaching => self.collect(&self.coaching, input, level).await?,
        };

        let min_agreement = level
            .effective_min_agreement(input.min_agreement.unwrap_or(self.settings.min_agreement));
        let consensus = self
            .validator
            .validate(&responses, input.task, min_agreement);

        self.log_outcome(input.task, level, &responses, &consensus);

        Ok(TaskOutcome {
            task_type: input.task,
            level,
            responses,
            consensus,
        })
    }

    async fn collect<A: TaskAgent>(
        &self,
        runner: &AgentRunner<A, G>,
        input: &ProcessTaskInput,
        level: ConsensusLevel,
    ) -> Result<Vec<AgentResponse>, ProcessTaskError> {
        let typed = Self::typed_input(runner, input.input.clone())?;
        let models = input.models.as_deref();

        match level {
            ConsensusLevel::Solo => {
                let model = models.and_then(|m| m.first());
                Ok(vec![runner.process(&typed, model).await?])
            }
            ConsensusLevel::Ensemble => Ok(runner
                .process_multi_model_with_progress(&typed, models, self.progress.as_ref())
                .await),
        }
    }

    fn deterministic_with<A: TaskAgent>(
        runner: &AgentRunner<A, G>,
        input: Value,
    ) -> Result<AgentResponse, ProcessTaskError> {
        let typed = Self::typed_input(runner, input)?;
        Ok(runner.deterministic(&typed)?)
    }

    fn typed_input<A: TaskAgent>(
        runner: &AgentRunner<A, G>,
        input: Value,
    ) -> Result<A::Input, ProcessTaskError> {
        let typed: A::Input = serde_json::from_value(input).map_err(|e| {
            ProcessTaskError::InvalidInput(format!("{}: {}", runner.agent().task_type(), e))
        })?;
        runner.agent().validate_input(&typed)?;
        Ok(typed)
    }

    fn log_outcome(
        &self,
        task: TaskType,
        level: ConsensusLevel,
        responses: &[AgentResponse],
        consensus: &ConsensusResult,
    ) {
        for response in responses {
            self.logger.log(ConsensusEvent::new(
                "agent_response",
                json!({
                    "task_type": task.as_str(),
                    "model": response.model_used(),
                    "confidence": response.confidence(),
                    "used_fallback": response.used_fallback(),
                    "reasoning": response.reasoning(),
                }),
            ));
        }

        self.logger.log(ConsensusEvent::new(
            "consensus_completed",
            json!({
                "task_type": task.as_str(),
                "level": level.to_string(),
                "is_valid": consensus.is_valid,
                "confidence": consensus.confidence,
                "agreement_score": consensus.agreement_score,
                "strategy": consensus.strategy.as_str(),
                "models": consensus.models,
                "warnings": consensus.warnings,
                "disagreements": consensus.disagreements,
            }),
        ));
    }
}
