//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_runner;
pub mod process_task;
