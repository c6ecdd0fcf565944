//! Configuration file loading for nutri-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Environment variables `NUTRI_QUORUM_<SECTION>__<KEY>`
//! 3. Project root: `./nutri-quorum.toml`
//! 4. Global: `$XDG_CONFIG_HOME/nutri-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentOverride, FileConfig, FileConsensusConfig, FileLoggingConfig,
    FileModelsConfig, FileProviderConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_CONFIG_FILE};
