//! Alert query engine and lifecycle operations.
//!
//! [`query::AlertQueryEngine`] serves the read side: single lookups, filtered
//! and sorted listings, full-text search, time-range queries and grouped
//! statistics. [`lifecycle::AlertLifecycle`] owns every mutation: creation,
//! edits, deletion and the status / level transitions.
//!
//! Both are constructed around an injected `Arc<dyn AlertStore>` and share
//! it; neither keeps state of its own.

pub mod error;
pub mod lifecycle;
pub mod pagination;
pub mod query;
pub mod stats;
pub mod time;

#[cfg(test)]
mod tests;

pub use error::{AlertError, Result};
pub use lifecycle::{AlertLifecycle, BatchInsertOutcome, BatchOutcome, Escalation, RejectedAlert};
pub use pagination::{Page, PageRequest};
pub use query::{AlertListQuery, AlertQueryEngine};
pub use stats::AlertStatistics;
