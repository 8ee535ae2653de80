//! Volatile in-process backend backed by `DashMap`.

use alertdesk_common::types::Alert;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;
use crate::filter::{AlertFilter, AlertSort};
use crate::AlertStore;

/// Thread-safe alert store keyed by alert id. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: DashMap<String, Alert>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self {
            alerts: DashMap::new(),
        }
    }

    fn matching(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.alerts
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn get(&self, id: &str) -> Result<Option<Alert>> {
        Ok(self.alerts.get(id).map(|r| r.clone()))
    }

    async fn put(&self, alert: &Alert) -> Result<()> {
        self.alerts.insert(alert.id.clone(), alert.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<Option<Alert>> {
        Ok(self.alerts.remove(id).map(|(_, v)| v))
    }

    async fn list_all(&self) -> Result<Vec<Alert>> {
        Ok(self.alerts.iter().map(|r| r.value().clone()).collect())
    }

    async fn count(&self, filter: &AlertFilter) -> Result<u64> {
        let n = self
            .alerts
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count();
        Ok(n as u64)
    }

    async fn query(
        &self,
        filter: &AlertFilter,
        sort: &AlertSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Alert>> {
        let mut rows = self.matching(filter);
        rows.sort_by(|a, b| sort.compare(a, b));
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn clear(&self) -> Result<()> {
        self.alerts.clear();
        Ok(())
    }

    async fn len(&self) -> Result<u64> {
        Ok(self.alerts.len() as u64)
    }
}
