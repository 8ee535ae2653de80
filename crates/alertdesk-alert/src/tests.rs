use crate::stats::NONE_BUCKET;
use crate::{AlertError, AlertLifecycle, AlertListQuery, AlertQueryEngine, PageRequest};
use alertdesk_common::types::{Alert, AlertLevel, AlertStatus, AlertUpdate, NewAlert};
use alertdesk_storage::{
    AlertFilter, AlertSort, AlertStore, MemoryAlertStore, Result as StorageResult, StorageError,
};
use async_trait::async_trait;
use std::sync::Arc;

fn setup() -> (Arc<MemoryAlertStore>, AlertQueryEngine, AlertLifecycle) {
    alertdesk_common::id::init(1, 1);
    let store = Arc::new(MemoryAlertStore::new());
    let query = AlertQueryEngine::new(store.clone());
    let lifecycle = AlertLifecycle::new(store.clone());
    (store, query, lifecycle)
}

fn new_alert(name: &str, level: &str, status: &str) -> NewAlert {
    NewAlert {
        name: Some(name.to_string()),
        alert_type: Some("host".to_string()),
        level: Some(level.to_string()),
        status: Some(status.to_string()),
        ..Default::default()
    }
}

/// Store whose every call fails; proves an operation never reached storage.
struct UnreachableStore;

fn unreachable_err() -> StorageError {
    StorageError::Io(std::io::Error::other("store must not be touched"))
}

#[async_trait]
impl AlertStore for UnreachableStore {
    async fn get(&self, _id: &str) -> StorageResult<Option<Alert>> {
        Err(unreachable_err())
    }
    async fn put(&self, _alert: &Alert) -> StorageResult<()> {
        Err(unreachable_err())
    }
    async fn remove(&self, _id: &str) -> StorageResult<Option<Alert>> {
        Err(unreachable_err())
    }
    async fn list_all(&self) -> StorageResult<Vec<Alert>> {
        Err(unreachable_err())
    }
    async fn count(&self, _filter: &AlertFilter) -> StorageResult<u64> {
        Err(unreachable_err())
    }
    async fn query(
        &self,
        _filter: &AlertFilter,
        _sort: &AlertSort,
        _offset: u64,
        _limit: u64,
    ) -> StorageResult<Vec<Alert>> {
        Err(unreachable_err())
    }
    async fn clear(&self) -> StorageResult<()> {
        Err(unreachable_err())
    }
    async fn len(&self) -> StorageResult<u64> {
        Err(unreachable_err())
    }
}

#[tokio::test]
async fn escalation_climbs_ladder_then_stops() {
    let (_store, query, lifecycle) = setup();
    let alert = lifecycle.create(new_alert("cpu", "LOW", "ACTIVE")).await.unwrap();

    let mut seen = vec![alert.level];
    for _ in 0..3 {
        let step = lifecycle.escalate(&alert.id).await.unwrap();
        assert_eq!(step.from, *seen.last().unwrap());
        assert!(step.to > step.from);
        seen.push(step.to);
    }
    assert_eq!(seen, AlertLevel::LADDER.to_vec());

    let before = query.get(&alert.id).await.unwrap();
    let err = lifecycle.escalate(&alert.id).await.unwrap_err();
    assert!(matches!(
        err,
        AlertError::AlreadyAtMaximum {
            level: AlertLevel::Critical,
            ..
        }
    ));
    let after = query.get(&alert.id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn escalation_of_three_tier_levels() {
    let (_store, _query, lifecycle) = setup();
    let alert = lifecycle.create(new_alert("cpu", "warning", "0")).await.unwrap();
    assert_eq!(alert.level, AlertLevel::Medium);
    let step = lifecycle.escalate(&alert.id).await.unwrap();
    assert_eq!(step.to, AlertLevel::High);
}

#[tokio::test]
async fn resolve_and_activate_are_idempotent() {
    let (_store, _query, lifecycle) = setup();
    let alert = lifecycle.create(new_alert("disk", "HIGH", "ACTIVE")).await.unwrap();

    let first = lifecycle.resolve(&alert.id).await.unwrap();
    let second = lifecycle.resolve(&alert.id).await.unwrap();
    for resolved in [&first, &second] {
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert!(resolved.is_recover);
        assert!(resolved.recover_time.is_some());
    }
    assert!(second.recover_time >= first.recover_time);
    assert!(second.update_time >= second.create_time);

    let active = lifecycle.activate(&alert.id).await.unwrap();
    assert_eq!(active.status, AlertStatus::Active);
    assert!(!active.is_recover);
    let again = lifecycle.activate(&alert.id).await.unwrap();
    assert_eq!(again.status, AlertStatus::Active);
}

#[tokio::test]
async fn pagination_over_twenty_five_alerts() {
    let (_store, query, lifecycle) = setup();
    for i in 0..25 {
        lifecycle
            .create(new_alert(&format!("alert-{i}"), "LOW", "ACTIVE"))
            .await
            .unwrap();
    }
    let list = AlertListQuery::default();

    let page1 = query.list(&list, PageRequest::new(Some(1), Some(10))).await.unwrap();
    assert_eq!(page1.data.len(), 10);
    assert_eq!(page1.total, 25);
    assert_eq!(page1.total_pages(), 3);

    let page3 = query.list(&list, PageRequest::new(Some(3), Some(10))).await.unwrap();
    assert_eq!(page3.data.len(), 5);

    let page4 = query.list(&list, PageRequest::new(Some(4), Some(10))).await.unwrap();
    assert!(page4.data.is_empty());
    assert_eq!(page4.total, 25);
    assert_eq!(page4.page_num, 4);

    let coerced = query.list(&list, PageRequest::new(Some(-1), Some(0))).await.unwrap();
    assert_eq!((coerced.page_num, coerced.page_size), (1, 10));
    assert_eq!(coerced.data.len(), 10);

    let huge = query
        .list(&list, PageRequest::new(Some(i64::MAX), Some(i64::MAX)))
        .await
        .unwrap();
    assert!(huge.data.is_empty());
}

#[tokio::test]
async fn created_alert_is_readable() {
    let (store, query, lifecycle) = setup();
    let created = lifecycle.create(new_alert("net", "critical", "1")).await.unwrap();
    assert_eq!(store.get(&created.id).await.unwrap(), Some(created.clone()));
    assert_eq!(query.get(&created.id).await.unwrap(), created);
    assert_eq!(created.description, "no description");
    assert_eq!(created.source, "system");
    assert_eq!(created.status, AlertStatus::Resolved);
    assert!(created.is_recover);
    assert!(created.recover_time.is_some());
    assert_eq!(created.create_time, created.update_time);
}

#[tokio::test]
async fn create_rejects_missing_fields_without_writing() {
    let (store, _query, lifecycle) = setup();
    let mut req = new_alert("  ", "LOW", "ACTIVE");
    let err = lifecycle.create(req.clone()).await.unwrap_err();
    assert!(matches!(err, AlertError::Validation(msg) if msg.contains("name")));

    req.name = Some("ok".into());
    req.level = Some("urgent".into());
    assert!(matches!(
        lifecycle.create(req).await.unwrap_err(),
        AlertError::Validation(_)
    ));

    let mut bad_time = new_alert("ok", "LOW", "ACTIVE");
    bad_time.end_time = Some("31/12/2024".into());
    assert!(lifecycle.create(bad_time).await.is_err());

    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn batch_insert_skips_invalid_entries() {
    let (store, _query, lifecycle) = setup();
    let reqs = vec![
        new_alert("a", "LOW", "ACTIVE"),
        new_alert("b", "", "ACTIVE"),
        new_alert("c", "HIGH", "PENDING"),
    ];
    let outcome = lifecycle.create_batch(reqs).await.unwrap();
    assert_eq!(outcome.inserted.len(), 2);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].index, 1);
    assert_eq!(store.len().await.unwrap(), 2);

    assert!(matches!(
        lifecycle.create_batch(Vec::new()).await.unwrap_err(),
        AlertError::Validation(_)
    ));
}

#[tokio::test]
async fn batch_delete_reports_partial_success() {
    let (store, _query, lifecycle) = setup();
    let a = lifecycle.create(new_alert("a", "LOW", "ACTIVE")).await.unwrap();
    let b = lifecycle.create(new_alert("b", "LOW", "ACTIVE")).await.unwrap();
    lifecycle.create(new_alert("c", "LOW", "ACTIVE")).await.unwrap();
    let before = store.len().await.unwrap();

    let ids = vec![a.id.clone(), " ".to_string(), b.id.clone(), "nope".to_string()];
    let outcome = lifecycle.delete_batch(&ids).await.unwrap();
    assert_eq!(outcome.succeeded, vec![a.id, b.id]);
    assert_eq!(outcome.not_found, vec!["nope".to_string()]);
    assert_eq!(store.len().await.unwrap(), before - 2);

    assert!(matches!(
        lifecycle.delete_batch(&[" ".to_string()]).await.unwrap_err(),
        AlertError::Validation(_)
    ));
}

#[tokio::test]
async fn delete_missing_alert_is_not_found() {
    let (_store, query, lifecycle) = setup();
    assert!(matches!(
        lifecycle.delete("404").await.unwrap_err(),
        AlertError::NotFound { .. }
    ));
    assert!(matches!(
        query.get("").await.unwrap_err(),
        AlertError::Validation(_)
    ));
}

#[tokio::test]
async fn batch_status_overwrites_and_collects_missing() {
    let (_store, query, lifecycle) = setup();
    let a = lifecycle.create(new_alert("a", "LOW", "ACTIVE")).await.unwrap();
    let b = lifecycle.create(new_alert("b", "LOW", "PENDING")).await.unwrap();

    let ids = vec![a.id.clone(), b.id.clone(), "ghost".to_string()];
    let outcome = lifecycle.batch_update_status(&ids, "resolved").await.unwrap();
    assert_eq!(outcome.succeeded.len(), 2);
    assert_eq!(outcome.not_found, vec!["ghost".to_string()]);
    for id in [&a.id, &b.id] {
        let alert = query.get(id).await.unwrap();
        assert_eq!(alert.status, AlertStatus::Resolved);
        assert!(alert.is_recover);
    }

    let none_found = lifecycle
        .batch_update_status(&["x".to_string()], "ACTIVE")
        .await
        .unwrap();
    assert!(none_found.succeeded.is_empty());
    assert_eq!(none_found.not_found.len(), 1);

    assert!(matches!(
        lifecycle.batch_update_status(&ids, "closed").await.unwrap_err(),
        AlertError::Validation(_)
    ));
}

#[tokio::test]
async fn update_ignores_blank_fields() {
    let (_store, _query, lifecycle) = setup();
    let alert = lifecycle.create(new_alert("cpu", "LOW", "ACTIVE")).await.unwrap();

    let update = AlertUpdate {
        name: Some("   ".into()),
        host: Some("db-02".into()),
        level: Some("high".into()),
        status: Some("RESOLVED".into()),
        ..Default::default()
    };
    let updated = lifecycle.update(&alert.id, update).await.unwrap();
    assert_eq!(updated.name, "cpu");
    assert_eq!(updated.host.as_deref(), Some("db-02"));
    assert_eq!(updated.level, AlertLevel::High);
    assert!(updated.is_recover);
    assert_eq!(updated.create_time, alert.create_time);
    assert!(updated.update_time >= alert.update_time);

    let err = lifecycle
        .update("missing", AlertUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::NotFound { .. }));
}

#[tokio::test]
async fn update_never_lowers_level() {
    let (store, _query, lifecycle) = setup();
    let alert = lifecycle.create(new_alert("db", "CRITICAL", "ACTIVE")).await.unwrap();

    let update = AlertUpdate {
        level: Some("LOW".into()),
        description: Some("downgraded".into()),
        ..Default::default()
    };
    let err = lifecycle.update(&alert.id, update).await.unwrap_err();
    assert!(matches!(err, AlertError::Validation(_)));
    assert_eq!(
        err.to_string(),
        "level cannot be lowered from CRITICAL to LOW"
    );

    let stored = store.get(&alert.id).await.unwrap().unwrap();
    assert_eq!(stored.level, AlertLevel::Critical);
    assert_eq!(stored.description, alert.description);

    let same = AlertUpdate {
        level: Some("critical".into()),
        ..Default::default()
    };
    let updated = lifecycle.update(&alert.id, same).await.unwrap();
    assert_eq!(updated.level, AlertLevel::Critical);
}

#[tokio::test]
async fn status_filter_returns_subset() {
    let (_store, query, lifecycle) = setup();
    for (i, status) in ["ACTIVE", "RESOLVED", "PENDING", "ACTIVE"].iter().enumerate() {
        lifecycle
            .create(new_alert(&format!("a{i}"), "LOW", status))
            .await
            .unwrap();
    }
    let page = PageRequest::new(Some(1), Some(100));
    let all = query.list(&AlertListQuery::default(), page).await.unwrap();
    assert_eq!(all.total, 4);

    let active_query = AlertListQuery {
        status: Some("active".into()),
        ..Default::default()
    };
    let active = query.list(&active_query, page).await.unwrap();
    assert_eq!(active.total, 2);
    for alert in &active.data {
        assert_eq!(alert.status, AlertStatus::Active);
        assert!(all.data.iter().any(|a| a.id == alert.id));
    }

    let blank_query = AlertListQuery {
        host: Some("".into()),
        company: Some("  ".into()),
        ..Default::default()
    };
    assert_eq!(query.list(&blank_query, page).await.unwrap().total, 4);

    let bad_order = AlertListQuery {
        sort_order: Some("sideways".into()),
        ..Default::default()
    };
    assert!(matches!(
        query.list(&bad_order, page).await.unwrap_err(),
        AlertError::Validation(_)
    ));
}

#[tokio::test]
async fn search_matches_any_keyword_field() {
    let (_store, query, lifecycle) = setup();
    let mut req = new_alert("order service", "LOW", "ACTIVE");
    req.description = Some("Payment gateway TIMEOUT".into());
    lifecycle.create(req).await.unwrap();
    let mut req = new_alert("disk", "LOW", "ACTIVE");
    req.host = Some("timeout-check-01".into());
    lifecycle.create(req).await.unwrap();
    lifecycle.create(new_alert("cpu", "LOW", "ACTIVE")).await.unwrap();

    let page = query.search("timeout", PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 2);

    assert!(matches!(
        query.search("  ", PageRequest::default()).await.unwrap_err(),
        AlertError::Validation(_)
    ));
}

#[tokio::test]
async fn inverted_time_range_is_rejected_before_store_access() {
    let query = AlertQueryEngine::new(Arc::new(UnreachableStore));
    let err = query
        .time_range("2024-12-31", "2024-01-01", None, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::Validation(_)));

    let err = query
        .time_range("not a date", "2024-01-01", None, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::Validation(_)));

    let err = query
        .time_range("2024-01-01", "2024-02-01", Some("DELETE"), PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::Validation(_)));

    let err = query
        .time_range("2024-01-01", "2024-02-01", None, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::Storage(_)));
}

#[tokio::test]
async fn time_range_over_create_and_end_time() {
    let (_store, query, lifecycle) = setup();
    let mut req = new_alert("late", "LOW", "ACTIVE");
    req.end_time = Some("2024-06-01 12:00:00".into());
    lifecycle.create(req).await.unwrap();
    lifecycle.create(new_alert("no end", "LOW", "ACTIVE")).await.unwrap();

    let created = query
        .time_range("2000-01-01", "2999-01-01", Some("create"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(created.total, 2);

    let ended = query
        .time_range(
            "2024-06-01 00:00:00",
            "2024-06-01 12:00:00",
            Some("END"),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(ended.total, 1);
    assert_eq!(ended.data[0].name, "late");
}

#[tokio::test]
async fn statistics_groupings_sum_to_total() {
    let (_store, query, lifecycle) = setup();
    let mut a = new_alert("a", "LOW", "ACTIVE");
    a.company = Some("Acme".into());
    a.system_name = Some("billing".into());
    lifecycle.create(a).await.unwrap();
    let mut b = new_alert("b", "HIGH", "RESOLVED");
    b.company = Some("Acme".into());
    lifecycle.create(b).await.unwrap();
    lifecycle.create(new_alert("c", "HIGH", "PENDING")).await.unwrap();

    let stats = query.statistics().await.unwrap();
    assert_eq!(stats.total, 3);
    for grouping in [
        &stats.by_status,
        &stats.by_level,
        &stats.by_type,
        &stats.by_company,
        &stats.by_system,
    ] {
        assert_eq!(grouping.values().sum::<u64>(), stats.total);
    }
    assert_eq!(stats.by_level.get("HIGH"), Some(&2));
    assert_eq!(stats.by_company.get("Acme"), Some(&2));
    assert_eq!(stats.by_company.get(NONE_BUCKET), Some(&1));
    assert_eq!(stats.by_system.get(NONE_BUCKET), Some(&2));
}

#[tokio::test]
async fn literal_none_company_shares_absent_bucket() {
    let (_store, query, lifecycle) = setup();
    let mut named = new_alert("a", "LOW", "ACTIVE");
    named.company = Some(NONE_BUCKET.into());
    lifecycle.create(named).await.unwrap();
    lifecycle.create(new_alert("b", "LOW", "ACTIVE")).await.unwrap();

    let stats = query.statistics().await.unwrap();
    assert_eq!(stats.by_company.len(), 1);
    assert_eq!(stats.by_company.get(NONE_BUCKET), Some(&2));
    assert_eq!(stats.by_company.values().sum::<u64>(), stats.total);
}

#[tokio::test]
async fn alert_type_options_include_defaults_and_observed() {
    let (_store, query, lifecycle) = setup();
    let mut req = new_alert("a", "LOW", "ACTIVE");
    req.alert_type = Some("network".into());
    lifecycle.create(req).await.unwrap();
    let types = query.alert_types().await.unwrap();
    assert_eq!(types, vec!["business", "host", "network"]);
}
