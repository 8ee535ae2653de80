//! Storage layer for alert records.
//!
//! [`AlertStore`] is the single read/write contract the query engine and the
//! lifecycle operations depend on. Two interchangeable backends implement it:
//!
//! - [`memory::MemoryAlertStore`]: a volatile in-process concurrent map.
//! - [`store::SeaOrmAlertStore`]: one `alerts` table reached through SeaORM
//!   (SQLite by default), with schema migrations applied on connect.
//!
//! Both backends execute the same [`AlertFilter`] / [`AlertSort`] values and
//! must return identical results for identical data.

pub mod entities;
pub mod error;
pub mod filter;
pub mod memory;
pub mod store;


use alertdesk_common::types::Alert;
use async_trait::async_trait;

pub use error::{Result, StorageError};
pub use filter::{AlertFilter, AlertSort, SortField, SortOrder, TimeField, TimeWindow};
pub use memory::MemoryAlertStore;
pub use store::SeaOrmAlertStore;

/// Persistence backend for alert records.
///
/// Implementations must be safe to share across threads (`Send + Sync`)
/// because the store is reached from the REST handlers and the tool
/// dispatcher concurrently. Single-key operations are atomic; nothing here
/// spans more than one key.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Fetches one alert by id.
    async fn get(&self, id: &str) -> Result<Option<Alert>>;

    /// Inserts or fully overwrites the alert with the same id.
    async fn put(&self, alert: &Alert) -> Result<()>;

    /// Removes an alert, returning the removed record.
    async fn remove(&self, id: &str) -> Result<Option<Alert>>;

    /// Snapshot of every stored alert, in no particular order.
    async fn list_all(&self) -> Result<Vec<Alert>>;

    /// Number of alerts matching `filter`.
    async fn count(&self, filter: &AlertFilter) -> Result<u64>;

    /// Alerts matching `filter`, ordered by `sort`, then sliced by
    /// `offset` / `limit`.
    async fn query(
        &self,
        filter: &AlertFilter,
        sort: &AlertSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Alert>>;

    /// Removes every alert. Intended for test harnesses and teardown.
    async fn clear(&self) -> Result<()>;

    /// Total number of stored alerts.
    async fn len(&self) -> Result<u64>;

    /// Whether the store holds no alerts at all.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
