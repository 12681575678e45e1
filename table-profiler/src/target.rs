//! Profiling targets: catalog-assigned ids and the tables they resolve to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProfilerError, Result};

/// Catalog-assigned identifier of a table to profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(i64);

impl TargetId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TargetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully-qualified `(namespace, table)` pair in the row store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedTable {
    pub namespace: String,
    pub table: String,
}

impl QualifiedTable {
    pub fn new(namespace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
        }
    }

    /// Parses a registered `namespace.table` name.
    ///
    /// The name must split on `.` into exactly two non-empty parts.
    pub fn parse(target_id: TargetId, name: &str) -> Result<Self> {
        let mut parts = name.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(table), None) if !namespace.is_empty() && !table.is_empty() => {
                Ok(Self::new(namespace, table))
            }
            _ => Err(ProfilerError::MalformedIdentifier {
                target_id,
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.table)
    }
}
