//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one record per agent response and per
    /// consensus; unset disables the log. A leading `~/` is expanded.
    pub consensus_log: Option<String>,
    /// Directory for daily-rolling diagnostic logs
    pub log_dir: Option<String>,
}

impl FileLoggingConfig {
    pub fn consensus_log_path(&self) -> Option<PathBuf> {
        self.consensus_log.as_deref().map(expand_home)
    }

    pub fn log_dir_path(&self) -> Option<PathBuf> {
        self.log_dir.as_deref().map(expand_home)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let config = FileLoggingConfig {
            consensus_log: Some("~/logs/consensus.jsonl".to_string()),
            log_dir: Some("/var/log/nutri".to_string()),
        };
        let path = config.consensus_log_path().unwrap();
        assert!(path.ends_with("logs/consensus.jsonl"));
        assert!(!path.to_string_lossy().starts_with('~'));
        assert_eq!(config.log_dir_path().unwrap(), PathBuf::from("/var/log/nutri"));
    }
}
