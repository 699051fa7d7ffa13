//! Engine configuration, read from the environment.
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `SMARTSTORE_SINK` | `none`, `memory`, `jsonl:<path>` | `none` |
//! | `SMARTSTORE_SINK_POLICY` | `strict`, `best-effort` | `strict` |

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::sink::{InMemorySink, JsonLinesSink, NoopSink, PersistenceSink, SinkError, SinkPolicy};

pub const SINK_VAR: &str = "SMARTSTORE_SINK";
pub const SINK_POLICY_VAR: &str = "SMARTSTORE_SINK_POLICY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var} value '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Where committed mutations are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SinkConfig {
    #[default]
    None,
    Memory,
    JsonLines(PathBuf),
}

impl SinkConfig {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            var: SINK_VAR,
            value: raw.to_string(),
        };
        match raw.trim() {
            "" | "none" => Ok(SinkConfig::None),
            "memory" => Ok(SinkConfig::Memory),
            other => match other.strip_prefix("jsonl:") {
                Some(path) if !path.trim().is_empty() => {
                    Ok(SinkConfig::JsonLines(PathBuf::from(path.trim())))
                }
                _ => Err(invalid()),
            },
        }
    }

    pub fn build(&self) -> Result<Arc<dyn PersistenceSink>, SinkError> {
        Ok(match self {
            SinkConfig::None => Arc::new(NoopSink),
            SinkConfig::Memory => Arc::new(InMemorySink::new()),
            SinkConfig::JsonLines(path) => Arc::new(JsonLinesSink::open(path)?),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub sink: SinkConfig,
    pub sink_policy: SinkPolicy,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sink = match lookup(SINK_VAR) {
            Some(raw) => SinkConfig::parse(&raw)?,
            None => SinkConfig::default(),
        };
        let sink_policy = match lookup(SINK_POLICY_VAR) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: SINK_POLICY_VAR,
                value: raw.clone(),
            })?,
            None => SinkPolicy::default(),
        };
        Ok(Self { sink, sink_policy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.sink_policy, SinkPolicy::Strict);
    }

    #[test]
    fn reads_sink_and_policy() {
        let config = EngineConfig::from_lookup(lookup(&[
            (SINK_VAR, "jsonl:/tmp/store.jsonl"),
            (SINK_POLICY_VAR, "best-effort"),
        ]))
        .unwrap();
        assert_eq!(config.sink, SinkConfig::JsonLines(PathBuf::from("/tmp/store.jsonl")));
        assert_eq!(config.sink_policy, SinkPolicy::BestEffort);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = EngineConfig::from_lookup(lookup(&[(SINK_VAR, "postgres")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: SINK_VAR,
                value: "postgres".to_string()
            }
        );
        assert!(SinkConfig::parse("jsonl:").is_err());
        assert!(EngineConfig::from_lookup(lookup(&[(SINK_POLICY_VAR, "lazy")])).is_err());
    }
}
