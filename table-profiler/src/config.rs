//! Configuration for a profiling run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProfilerError, Result};

/// Default maximum number of distinct values for a categorical column.
pub const DEFAULT_CATEGORICAL_THRESHOLD: u64 = 10;

/// Configuration for [`crate::profiler::TableProfiler`].
///
/// Loadable from JSON:
///
/// ```rust
/// use table_profiler::config::ProfilerConfig;
///
/// let config = ProfilerConfig::from_json_str(
///     r#"{ "categorical_threshold": 5, "actor": "etl", "timeout_ms": 30000 }"#,
/// ).unwrap();
/// assert_eq!(config.categorical_threshold, 5);
/// assert_eq!(config.timeout, Some(std::time::Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Columns with at most this many distinct non-null values are categorical.
    pub categorical_threshold: u64,
    /// Actor recorded on catalog writes. Defaults to the invoking user.
    pub actor: Option<String>,
    /// Deadline for the whole run.
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Option<Duration>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
            actor: None,
            timeout: None,
        }
    }
}

impl ProfilerConfig {
    /// Creates a new builder starting from the defaults.
    pub fn builder() -> ProfilerConfigBuilder {
        ProfilerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ProfilerError::Configuration(format!("Invalid profiler config: {e}")))
    }
}

/// Builder for [`ProfilerConfig`].
#[derive(Debug, Clone)]
pub struct ProfilerConfigBuilder {
    config: ProfilerConfig,
}

impl ProfilerConfigBuilder {
    /// Set the categorical-distinctness threshold (inclusive).
    pub fn categorical_threshold(mut self, threshold: u64) -> Self {
        self.config.categorical_threshold = threshold;
        self
    }

    /// Set the actor recorded on catalog writes.
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.config.actor = Some(actor.into());
        self
    }

    /// Set a deadline for the whole run.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ProfilerConfig {
        self.config
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
