//! Orchestration settings shared by the use cases.

pub mod mode;

pub use mode::ConsensusLevel;
