//! Shared data model for alertdesk: the [`types::Alert`] record, its level and
//! status enums, the request shapes used to create and edit alerts, and the
//! process-wide id generator.

pub mod id;
pub mod types;
