//! Prelude for commonly used types and traits in table-profiler.

pub use crate::audit::{AuditSource, AuditStamp, FixedAudit, SystemAudit};
pub use crate::catalog::{CatalogSink, InMemoryCatalog, TargetResolver};
pub use crate::classify::Classification;
pub use crate::config::ProfilerConfig;
pub use crate::error::{ProfilerError, Result};
pub use crate::profiler::{ProfileReport, TableProfiler};
pub use crate::store::TableStore;
pub use crate::target::{QualifiedTable, TargetId};
