//! Actor/timestamp stamping for catalog writes.
//!
//! Every record the profiler writes carries an [`AuditStamp`]. Stamps are
//! produced by an [`AuditSource`] passed explicitly into the run, so tests can
//! supply fixed values instead of the wall clock and the invoking user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProfilerConfig;

/// Fallback actor name when the invoking user cannot be determined.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Who wrote a catalog record, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditStamp {
    pub fn new(actor: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            timestamp,
        }
    }

    /// Stamps the current instant for `actor`.
    pub fn now(actor: impl Into<String>) -> Self {
        Self::new(actor, Utc::now())
    }
}

/// Source of audit stamps for a profiling run.
pub trait AuditSource: Send + Sync {
    /// Returns the stamp for the next catalog write.
    fn stamp(&self) -> AuditStamp;
}

/// Stamps writes with a fixed actor and the current time.
#[derive(Debug, Clone)]
pub struct SystemAudit {
    actor: String,
}

impl SystemAudit {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    /// Uses the configured actor, falling back to the invoking user.
    pub fn from_config(config: &ProfilerConfig) -> Self {
        match &config.actor {
            Some(actor) => Self::new(actor.clone()),
            None => Self::new(current_user()),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl AuditSource for SystemAudit {
    fn stamp(&self) -> AuditStamp {
        AuditStamp::now(self.actor.clone())
    }
}

/// Returns the same stamp for every write.
#[derive(Debug, Clone)]
pub struct FixedAudit(pub AuditStamp);

impl AuditSource for FixedAudit {
    fn stamp(&self) -> AuditStamp {
        self.0.clone()
    }
}

/// Name of the invoking user from `USER` or `USERNAME`.
pub fn current_user() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ACTOR.to_string())
}
