use alertdesk_common::id;
use alertdesk_common::types::{
    Alert, AlertLevel, AlertStatus, AlertUpdate, NewAlert, DEFAULT_DESCRIPTION, DEFAULT_SOURCE,
};
use alertdesk_storage::AlertStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{AlertError, Result};
use crate::time::parse_optional_time;

/// Result of a batch operation over ids. Not-found ids never fail the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub succeeded: Vec<String>,
    pub not_found: Vec<String>,
}

/// One entry skipped by a batch insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedAlert {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchInsertOutcome {
    pub inserted: Vec<Alert>,
    pub rejected: Vec<RejectedAlert>,
}

/// A successful one-step escalation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Escalation {
    pub alert: Alert,
    pub from: AlertLevel,
    pub to: AlertLevel,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    blank_to_none(value).ok_or_else(|| AlertError::validation(format!("{field} is required")))
}

fn parse_level(raw: &str) -> Result<AlertLevel> {
    raw.parse().map_err(AlertError::Validation)
}

fn parse_status(raw: &str) -> Result<AlertStatus> {
    raw.parse().map_err(AlertError::Validation)
}

/// Trims ids, drops blanks and duplicates, keeping first-seen order.
fn normalize_ids(ids: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let ids: Vec<String> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return Err(AlertError::validation("at least one alert id is required"));
    }
    Ok(ids)
}

fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AlertError::validation("alert id is required"));
    }
    Ok(id)
}

/// Validates a creation request and builds the record it describes.
fn build_alert(req: NewAlert, id: String, now: DateTime<Utc>) -> Result<Alert> {
    let name = required("name", req.name)?;
    let alert_type = required("type", req.alert_type)?;
    let level = parse_level(&required("level", req.level)?)?;
    let status = parse_status(&required("status", req.status)?)?;
    let begin_time = parse_optional_time("beginTime", req.begin_time.as_deref())?;
    let end_time = parse_optional_time("endTime", req.end_time.as_deref())?;

    let mut alert = Alert {
        id,
        name,
        alert_type,
        level,
        status,
        description: blank_to_none(req.description)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        source: blank_to_none(req.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        company: blank_to_none(req.company),
        system_name: blank_to_none(req.system_name),
        task_name: blank_to_none(req.task_name),
        host: blank_to_none(req.host),
        region: blank_to_none(req.region),
        rule: blank_to_none(req.rule),
        value: blank_to_none(req.value),
        threshold: blank_to_none(req.threshold),
        ave_time: blank_to_none(req.ave_time),
        actual_value: blank_to_none(req.actual_value),
        is_recover: false,
        create_time: now,
        update_time: now,
        begin_time,
        end_time,
        recover_time: None,
    };
    alert.apply_status(status, now);
    Ok(alert)
}

/// Parsed form of an [`AlertUpdate`]; every value is already validated.
#[derive(Default)]
struct ParsedUpdate {
    name: Option<String>,
    alert_type: Option<String>,
    level: Option<AlertLevel>,
    status: Option<AlertStatus>,
    description: Option<String>,
    source: Option<String>,
    company: Option<String>,
    system_name: Option<String>,
    task_name: Option<String>,
    host: Option<String>,
    region: Option<String>,
    rule: Option<String>,
    value: Option<String>,
    threshold: Option<String>,
    ave_time: Option<String>,
    actual_value: Option<String>,
    begin_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl ParsedUpdate {
    fn parse(req: AlertUpdate) -> Result<Self> {
        Ok(Self {
            level: blank_to_none(req.level)
                .map(|s| parse_level(&s))
                .transpose()?,
            status: blank_to_none(req.status)
                .map(|s| parse_status(&s))
                .transpose()?,
            begin_time: parse_optional_time("beginTime", req.begin_time.as_deref())?,
            end_time: parse_optional_time("endTime", req.end_time.as_deref())?,
            name: blank_to_none(req.name),
            alert_type: blank_to_none(req.alert_type),
            description: blank_to_none(req.description),
            source: blank_to_none(req.source),
            company: blank_to_none(req.company),
            system_name: blank_to_none(req.system_name),
            task_name: blank_to_none(req.task_name),
            host: blank_to_none(req.host),
            region: blank_to_none(req.region),
            rule: blank_to_none(req.rule),
            value: blank_to_none(req.value),
            threshold: blank_to_none(req.threshold),
            ave_time: blank_to_none(req.ave_time),
            actual_value: blank_to_none(req.actual_value),
        })
    }

    fn apply(self, alert: &mut Alert, now: DateTime<Utc>) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut alert.name, self.name);
        set(&mut alert.alert_type, self.alert_type);
        set(&mut alert.level, self.level);
        set(&mut alert.description, self.description);
        set(&mut alert.source, self.source);
        set_opt(&mut alert.company, self.company);
        set_opt(&mut alert.system_name, self.system_name);
        set_opt(&mut alert.task_name, self.task_name);
        set_opt(&mut alert.host, self.host);
        set_opt(&mut alert.region, self.region);
        set_opt(&mut alert.rule, self.rule);
        set_opt(&mut alert.value, self.value);
        set_opt(&mut alert.threshold, self.threshold);
        set_opt(&mut alert.ave_time, self.ave_time);
        set_opt(&mut alert.actual_value, self.actual_value);
        set_opt(&mut alert.begin_time, self.begin_time);
        set_opt(&mut alert.end_time, self.end_time);
        if let Some(status) = self.status {
            alert.apply_status(status, now);
        }
    }
}

/// 告警变更操作：创建、更新、删除以及状态与级别流转。
///
/// 所有变更均刷新 `updateTime` 并通过 [`AlertStore::put`] 持久化。
#[derive(Clone)]
pub struct AlertLifecycle {
    store: Arc<dyn AlertStore>,
}

impl AlertLifecycle {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, req: NewAlert) -> Result<Alert> {
        let alert = build_alert(req, id::next_id(), Utc::now())?;
        self.store.put(&alert).await?;
        tracing::info!(
            alert_id = %alert.id,
            level = %alert.level,
            status = %alert.status,
            "Alert created"
        );
        Ok(alert)
    }

    /// Inserts every valid entry; invalid ones are skipped and reported with
    /// their position in `reqs`.
    pub async fn create_batch(&self, reqs: Vec<NewAlert>) -> Result<BatchInsertOutcome> {
        if reqs.is_empty() {
            return Err(AlertError::validation("at least one alert is required"));
        }
        let mut outcome = BatchInsertOutcome::default();
        for (index, req) in reqs.into_iter().enumerate() {
            match build_alert(req, id::next_id(), Utc::now()) {
                Ok(alert) => {
                    self.store.put(&alert).await?;
                    outcome.inserted.push(alert);
                }
                Err(AlertError::Validation(reason)) => {
                    outcome.rejected.push(RejectedAlert { index, reason });
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            inserted = outcome.inserted.len(),
            rejected = outcome.rejected.len(),
            "Batch alert insert finished"
        );
        Ok(outcome)
    }

    /// Applies the non-blank fields of `req`. A level given here may stay the
    /// same or move up, never down; a status change follows the recover rules.
    pub async fn update(&self, id: &str, req: AlertUpdate) -> Result<Alert> {
        let id = require_id(id)?;
        let parsed = ParsedUpdate::parse(req)?;
        let mut alert = self.load(id).await?;
        if let Some(level) = parsed.level.filter(|level| *level < alert.level) {
            return Err(AlertError::validation(format!(
                "level cannot be lowered from {} to {level}",
                alert.level
            )));
        }
        let now = Utc::now();
        parsed.apply(&mut alert, now);
        alert.touch(now);
        self.store.put(&alert).await?;
        tracing::info!(alert_id = %id, "Alert updated");
        Ok(alert)
    }

    pub async fn delete(&self, id: &str) -> Result<Alert> {
        let id = require_id(id)?;
        let removed = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| AlertError::NotFound { id: id.to_string() })?;
        tracing::info!(alert_id = %id, "Alert deleted");
        Ok(removed)
    }

    pub async fn delete_batch(&self, ids: &[String]) -> Result<BatchOutcome> {
        let ids = normalize_ids(ids)?;
        let mut outcome = BatchOutcome::default();
        for id in ids {
            if self.store.remove(&id).await?.is_some() {
                outcome.succeeded.push(id);
            } else {
                outcome.not_found.push(id);
            }
        }
        tracing::info!(
            deleted = outcome.succeeded.len(),
            not_found = outcome.not_found.len(),
            "Batch alert delete finished"
        );
        Ok(outcome)
    }

    /// Marks the alert RESOLVED. Resolving again re-stamps `recoverTime`.
    pub async fn resolve(&self, id: &str) -> Result<Alert> {
        self.set_status(id, AlertStatus::Resolved).await
    }

    /// Marks the alert ACTIVE and clears the recover flag.
    pub async fn activate(&self, id: &str) -> Result<Alert> {
        self.set_status(id, AlertStatus::Active).await
    }

    /// Moves the level one step up the ladder. At CRITICAL nothing is
    /// written and [`AlertError::AlreadyAtMaximum`] is returned.
    pub async fn escalate(&self, id: &str) -> Result<Escalation> {
        let id = require_id(id)?;
        let mut alert = self.load(id).await?;
        let from = alert.level;
        let Some(to) = from.next() else {
            return Err(AlertError::AlreadyAtMaximum {
                id: id.to_string(),
                level: from,
            });
        };
        alert.level = to;
        alert.touch(Utc::now());
        self.store.put(&alert).await?;
        tracing::info!(alert_id = %id, from = %from, to = %to, "Alert escalated");
        Ok(Escalation { alert, from, to })
    }

    /// Overwrites the status of every listed alert, bypassing the escalation
    /// rules. Missing ids are reported in `not_found`.
    pub async fn batch_update_status(&self, ids: &[String], status: &str) -> Result<BatchOutcome> {
        let status = match blank_to_none(Some(status.to_string())) {
            Some(raw) => parse_status(&raw)?,
            None => return Err(AlertError::validation("status is required")),
        };
        let ids = normalize_ids(ids)?;
        let mut outcome = BatchOutcome::default();
        for id in ids {
            match self.store.get(&id).await? {
                Some(mut alert) => {
                    let now = Utc::now();
                    alert.apply_status(status, now);
                    alert.touch(now);
                    self.store.put(&alert).await?;
                    outcome.succeeded.push(id);
                }
                None => outcome.not_found.push(id),
            }
        }
        tracing::info!(
            status = %status,
            updated = outcome.succeeded.len(),
            not_found = outcome.not_found.len(),
            "Batch alert status update finished"
        );
        Ok(outcome)
    }

    async fn set_status(&self, id: &str, status: AlertStatus) -> Result<Alert> {
        let id = require_id(id)?;
        let mut alert = self.load(id).await?;
        let now = Utc::now();
        alert.apply_status(status, now);
        alert.touch(now);
        self.store.put(&alert).await?;
        tracing::info!(alert_id = %id, status = %status, "Alert status changed");
        Ok(alert)
    }

    async fn load(&self, id: &str) -> Result<Alert> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AlertError::NotFound { id: id.to_string() })
    }
}
