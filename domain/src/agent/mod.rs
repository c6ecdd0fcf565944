//! Agent contract and the envelope every agent invocation produces.
//!
//! An agent turns a typed input into one model-backed result, with a
//! deterministic rule-based fallback for when no model answer is usable.
//! The control flow (model selection, fallback recursion, fan-out) lives in
//! the application layer; this module only holds the pure pieces.

pub mod config;
pub mod contract;
pub mod parsing;
pub mod response;
pub mod task_type;

pub use config::AgentConfig;
pub use contract::{ImageSource, Prompt, TaskAgent};
pub use response::AgentResponse;
pub use task_type::TaskType;
