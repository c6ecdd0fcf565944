//! Agent runner
//!
//! Drives any [`TaskAgent`] against an [`LlmGateway`]:
//! 1. `process` - one model call, parse, score, fall back when unsure
//! 2. `fallback` - the fallback model, or the rule-based result
//! 3. `process_multi_model` - the same input against several models at once

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use nutri_domain::{AgentResponse, DomainError, Model, TaskAgent, TaskType};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors from a single agent invocation
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("No model configured for {0}")]
    NoModelConfigured(TaskType),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid agent response: {0}")]
    Domain(#[from] DomainError),

    #[error("Could not serialize agent result: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Generic runner for one task agent.
///
/// Holds only shared read-only state, so clones are cheap and can be moved
/// into concurrent tasks.
pub struct AgentRunner<A: TaskAgent, G: LlmGateway + 'static> {
    agent: Arc<A>,
    gateway: Arc<G>,
}

impl<A: TaskAgent, G: LlmGateway + 'static> Clone for AgentRunner<A, G> {
    fn clone(&self) -> Self {
        Self {
            agent: Arc::clone(&self.agent),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<A: TaskAgent, G: LlmGateway + 'static> AgentRunner<A, G> {
    pub fn new(agent: A, gateway: Arc<G>) -> Self {
        Self {
            agent: Arc::new(agent),
            gateway,
        }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Run the agent once.
    ///
    /// Uses `model` when given, else the first primary model, else the
    /// fallback model. A result below the confidence threshold is replaced
    /// by [`fallback`](Self::fallback) unless it already came from the
    /// fallback model. Gateway errors propagate.
    pub async fn process(
        &self,
        input: &A::Input,
        model: Option<&Model>,
    ) -> Result<AgentResponse, AgentError> {
        let task = self.agent.task_type();
        let config = self.agent.config();
        let model = config
            .select_model(model)
            .ok_or(AgentError::NoModelConfigured(task))?;

        let response = self.call_model(input, &model).await?;

        if response.confidence() < config.confidence_threshold && !config.is_fallback_model(&model)
        {
            warn!(
                "{} result from {} below threshold ({:.2} < {:.2}), falling back",
                task,
                model,
                response.confidence(),
                config.confidence_threshold
            );
            return self.fallback(input).await;
        }

        Ok(response)
    }

    /// Fallback path.
    ///
    /// With a fallback model configured this is a model call that is never
    /// itself replaced; without one it is the deterministic result at
    /// confidence 0.5.
    pub async fn fallback(&self, input: &A::Input) -> Result<AgentResponse, AgentError> {
        match &self.agent.config().fallback_model {
            Some(model) => {
                info!("{} using fallback model {}", self.agent.task_type(), model);
                let response = self.call_model(input, model).await?;
                Ok(response.with_fallback(true))
            }
            None => self.deterministic(input),
        }
    }

    /// Rule-based result, no model call
    pub fn deterministic(&self, input: &A::Input) -> Result<AgentResponse, AgentError> {
        let result = serde_json::to_value(self.agent.deterministic_fallback(input))?;
        Ok(AgentResponse::deterministic(
            result,
            format!("rule-based {} fallback", self.agent.task_type()),
        )
        .with_metadata("task_type", self.agent.task_type().as_str()))
    }

    /// Run the agent against up to `max_fan_out` models concurrently.
    ///
    /// Failed calls are logged and dropped; the survivors come back in the
    /// order of the model list. Every call failing yields an empty list.
    pub async fn process_multi_model(
        &self,
        input: &A::Input,
        models: Option<&[Model]>,
    ) -> Vec<AgentResponse> {
        self.process_multi_model_with_progress(input, models, &NoProgress)
            .await
    }

    /// [`process_multi_model`](Self::process_multi_model) with progress callbacks
    pub async fn process_multi_model_with_progress(
        &self,
        input: &A::Input,
        models: Option<&[Model]>,
        progress: &dyn ProgressNotifier,
    ) -> Vec<AgentResponse> {
        let task = self.agent.task_type();
        let models = self.agent.config().fan_out_models(models);
        info!("Fanning out {} to {} models", task, models.len());
        progress.on_fan_out_start(task, &models);

        let mut join_set = JoinSet::new();

        for (index, model) in models.iter().enumerate() {
            let runner = self.clone();
            let model = model.clone();
            let input = input.clone();

            join_set.spawn(async move {
                let result = runner.process(&input, Some(&model)).await;
                (index, model, result)
            });
        }

        let mut responses = Vec::with_capacity(models.len());

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, model, Ok(response))) => {
                    debug!("Model {} responded for {}", model, task);
                    progress.on_model_complete(task, &model, true);
                    responses.push((index, response));
                }
                Ok((_, model, Err(e))) => {
                    warn!("Model {} failed for {}: {}", model, task, e);
                    progress.on_model_complete(task, &model, false);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        responses.sort_by_key(|(index, _)| *index);
        progress.on_fan_out_complete(task, responses.len(), models.len());
        responses.into_iter().map(|(_, response)| response).collect()
    }

    /// One model call: prompt, generate, parse, score.
    ///
    /// Output that cannot be parsed is replaced by the deterministic result
    /// with confidence 0.0, so it always loses to a real answer.
    async fn call_model(
        &self,
        input: &A::Input,
        model: &Model,
    ) -> Result<AgentResponse, AgentError> {
        let task = self.agent.task_type();
        if model.is_deterministic() {
            return self.deterministic(input);
        }

        let prompt = self.agent.build_prompt(input);
        let started = Instant::now();
        let raw = self.gateway.generate(model, &prompt).await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let response = match self.agent.try_parse(&raw, input) {
            Some(result) => {
                let confidence = self
                    .agent
                    .calculate_confidence(&result, &raw)
                    .clamp(0.0, 1.0);
                AgentResponse::new(serde_json::to_value(result)?, confidence, model.as_str())?
                    .with_reasoning(format!("{} parsed from {} output", task, model))
            }
            None => {
                warn!("Could not parse {} output from {}", task, model);
                let result = serde_json::to_value(self.agent.deterministic_fallback(input))?;
                AgentResponse::new(result, 0.0, model.as_str())?
                    .with_reasoning(format!(
                        "unparseable {} output; rule-based result substituted",
                        model
                    ))
                    .with_fallback(true)
            }
        };

        debug!(
            "{} from {}: confidence {:.2} in {} ms",
            task,
            model,
            response.confidence(),
            latency_ms
        );

        Ok(response
            .with_metadata("task_type", task.as_str())
            .with_metadata("latency_ms", Value::from(latency_ms)))
    }
}
