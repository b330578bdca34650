//! Scope configuration.
//!
//! Loaded from a JSON file where every field is optional, then overridden
//! by command-line flags in the host binary.

use crate::core::{ChannelName, ChannelSpec, ChannelTable};
use crate::engine::{RuntimeOptions, StreamEndPolicy};
use crate::error::ConfigError;
use crate::render::{ScaleMap, ScalePolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
pub const DEFAULT_WINDOW_LEN: usize = 400;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub tick_interval_ms: u64,
    pub window_len: usize,
    /// Replaces the vehicle table when present.
    pub channels: Option<Vec<ChannelSpec>>,
    /// Defaults to the vehicle autoscale set with the vehicle table, and to
    /// nothing with a custom table.
    pub autoscale: Option<Vec<ChannelName>>,
    pub fixed_ranges: BTreeMap<ChannelName, FixedRange>,
    pub on_stream_end: StreamEndPolicy,
    pub fail_on_read_error: bool,
    pub write_empty_frames: bool,
    pub logging: LoggingConfig,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            window_len: DEFAULT_WINDOW_LEN,
            channels: None,
            autoscale: None,
            fixed_ranges: BTreeMap::new(),
            on_stream_end: StreamEndPolicy::Exit,
            fail_on_read_error: false,
            write_empty_frames: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl ScopeConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.window_len == 0 {
            return Err(ConfigError::Invalid(
                "window_len must be greater than 0".to_string(),
            ));
        }

        let table = self.table()?;
        let scales = self.scales();
        for name in scales.names() {
            if table.index_of_name(name.as_str()).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "scale configured for unknown channel '{}'",
                    name
                )));
            }
        }
        for (name, range) in &self.fixed_ranges {
            if !(range.min < range.max) {
                return Err(ConfigError::Invalid(format!(
                    "fixed range for '{}' needs min < max",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn table(&self) -> Result<ChannelTable, ConfigError> {
        match &self.channels {
            Some(specs) => Ok(ChannelTable::new(specs)?),
            None => Ok(ChannelTable::vehicle()),
        }
    }

    /// Fixed ranges win over autoscale for the same channel.
    pub fn scales(&self) -> ScaleMap {
        let mut scales = match (&self.autoscale, &self.channels) {
            (Some(names), _) => ScaleMap::autoscaled(names.iter().cloned()),
            (None, None) => ScaleMap::vehicle(),
            (None, Some(_)) => ScaleMap::new(),
        };
        for (name, range) in &self.fixed_ranges {
            scales.set(
                name.clone(),
                ScalePolicy::Fixed {
                    min: range.min,
                    max: range.max,
                },
            );
        }
        scales
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            tick_interval: self.tick_interval(),
            on_stream_end: self.on_stream_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = ScopeConfig::from_json("{}").unwrap();
        assert_eq!(config, ScopeConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
        assert_eq!(config.table().unwrap().len(), ChannelTable::vehicle().len());
    }

    #[test]
    fn test_fixed_range_overrides_autoscale() {
        let config = ScopeConfig::from_json(
            r#"{"autoscale": ["x", "y"], "fixed_ranges": {"y": {"min": -2.0, "max": 2.0}}}"#,
        )
        .unwrap();
        let scales = config.scales();
        assert_eq!(scales.get("x"), Some(ScalePolicy::Autoscale));
        assert_eq!(
            scales.get("y"),
            Some(ScalePolicy::Fixed { min: -2.0, max: 2.0 })
        );
    }

    #[test]
    fn test_custom_table_has_no_default_autoscale() {
        let config =
            ScopeConfig::from_json(r#"{"channels": [{"position": 1, "name": "rpm"}]}"#).unwrap();
        assert!(config.scales().is_empty());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = ScopeConfig::from_json(r#"{"tick_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
