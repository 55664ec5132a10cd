//! CLI configuration file (`queuebatch.yaml`).

use anyhow::{Context, Result};
use queuebatch_dispatch::DispatchConfig;
use queuebatch_observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load from a YAML file, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "dispatch:\n  max_concurrency: 4\n  message_timeout_ms: 1500\nlog:\n  json: true\n",
        )
        .unwrap();
        assert_eq!(config.dispatch.max_concurrency, 4);
        assert_eq!(config.dispatch.message_timeout_ms, Some(1_500));
        assert_eq!(config.dispatch.deadline_margin_ms, 0);
        assert!(config.log.json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn default_config_round_trips_through_yaml() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        let back = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(back.dispatch, DispatchConfig::default());
    }

    #[test]
    fn missing_path_means_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.dispatch.concurrency(), 1);
    }
}
