//! # table-profiler
//!
//! Column type inference and statistical profiling of relational tables of
//! unknown schema, recorded into a metadata catalog.
//!
//! ## Overview
//!
//! For every column of a registered table the profiler infers one of four
//! classifications and computes the matching summary statistics:
//!
//! | Classification | Catalog name | Statistics |
//! |---|---|---|
//! | Numeric | `numeric` | min, max, mean, median |
//! | Date | `date` | min date, max date |
//! | Categorical | `code` | frequency of every distinct value |
//! | Text | `text` | max, min and median length |
//!
//! Classification is a cascade of all-or-nothing conversion probes: a column
//! is numeric if every value converts to a number, otherwise a date if every
//! value converts to a date, otherwise categorical if it has at most
//! `categorical_threshold` distinct values, otherwise text.
//!
//! Tables live in a DataFusion [`SessionContext`](datafusion::prelude::SessionContext)
//! wrapped by [`store::TableStore`]. Results are written through the
//! [`catalog::CatalogSink`] trait; [`catalog::InMemoryCatalog`] is provided.
//!
//! ## Quick Start
//!
//! ```rust
//! use table_profiler::prelude::*;
//! use datafusion::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let ctx = SessionContext::new();
//! // ... register your tables under a namespace schema ...
//! let store = TableStore::new(ctx);
//!
//! let catalog = InMemoryCatalog::new();
//! catalog.register_target(TargetId::new(1), "agency.drop_2019").await;
//!
//! let config = ProfilerConfig::builder().categorical_threshold(25).build();
//! let audit = SystemAudit::from_config(&config);
//! let report = TableProfiler::new(config)
//!     .profile(TargetId::new(1), &store, &catalog, &catalog, &audit)
//!     .await?;
//!
//! for column in &report.columns {
//!     println!("{}: {}", column.name, column.classification);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` spans and events. Install a subscriber with
//! [`logging::setup::init_logging`] or bring your own.

pub mod audit;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod profiler;
pub mod security;
pub mod staging;
pub mod stats;
pub mod store;
pub mod target;

#[cfg(test)]
mod test_fixtures;
