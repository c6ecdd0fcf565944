//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: model identifiers used by agents
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
