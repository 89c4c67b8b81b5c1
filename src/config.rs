//! Runtime configuration for the task workflow.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading [`WorkflowConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this configuration.
    #[error("invalid workflow configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A persistence timeout of zero would fail every write.
    #[error("persistence timeout must be greater than zero")]
    ZeroTimeout,
}

/// Workflow settings shared by every service of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Deadline for each backend request; expiry rolls the write back.
    pub persistence_timeout: Duration,
    /// Change-feed table carrying task rows; events for other tables are
    /// ignored.
    pub tasks_table: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            persistence_timeout: Duration::from_secs(10),
            tasks_table: "tasks".to_owned(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWorkflowConfig {
    persistence_timeout_ms: Option<u64>,
    tasks_table: Option<String>,
}

impl WorkflowConfig {
    /// Creates a configuration with a short deadline, for tests.
    #[must_use]
    pub fn with_timeout(persistence_timeout: Duration) -> Self {
        Self {
            persistence_timeout,
            ..Self::default()
        }
    }

    /// Parses a JSON document; omitted fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields,
    /// and [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let raw: RawWorkflowConfig = serde_json::from_str(document)?;
        let defaults = Self::default();
        let persistence_timeout = raw
            .persistence_timeout_ms
            .map_or(defaults.persistence_timeout, Duration::from_millis);
        if persistence_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            persistence_timeout,
            tasks_table: raw.tasks_table.unwrap_or(defaults.tasks_table),
        })
    }
}
