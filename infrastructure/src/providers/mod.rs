//! Inference provider adapters implementing the
//! [`LlmGateway`](nutri_application::LlmGateway) port.

pub mod openai;

pub use openai::{GatewayConfig, OpenAiCompatibleGateway, RetryPolicy};
