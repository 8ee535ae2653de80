use alertdesk_alert::time::format_time;
use alertdesk_alert::AlertLifecycle;
use alertdesk_common::types::NewAlert;
use alertdesk_storage::AlertStore;
use chrono::{Duration, Utc};

/// Demo alert definitions written on first start.
struct SampleDef {
    name: &'static str,
    level: &'static str,
    status: &'static str,
    description: &'static str,
    rule: &'static str,
    value: &'static str,
    threshold: &'static str,
    /// 开始时间距今分钟数
    begin_ago_mins: i64,
    /// 结束时间距今分钟数
    end_ago_mins: i64,
}

const SAMPLE_ALERTS: &[SampleDef] = &[
    SampleDef {
        name: "CPU告警",
        level: "HIGH",
        status: "ACTIVE",
        description: "CPU使用率过高",
        rule: "cpu > 80%",
        value: "85%",
        threshold: "80%",
        begin_ago_mins: 120,
        end_ago_mins: 60,
    },
    SampleDef {
        name: "内存告警",
        level: "MEDIUM",
        status: "PENDING",
        description: "内存使用率较高",
        rule: "memory > 70%",
        value: "75%",
        threshold: "70%",
        begin_ago_mins: 60,
        end_ago_mins: 30,
    },
    SampleDef {
        name: "磁盘告警",
        level: "LOW",
        status: "RESOLVED",
        description: "磁盘空间不足",
        rule: "disk > 90%",
        value: "95%",
        threshold: "90%",
        begin_ago_mins: 180,
        end_ago_mins: 10,
    },
];

const SAMPLE_TYPE: &str = "system";
const SAMPLE_SOURCE: &str = "monitoring";

/// Seeds the demo alerts if the store holds no alerts yet.
///
/// Returns the number of alerts written (0 when the store was not empty).
pub async fn init_sample_alerts(
    store: &dyn AlertStore,
    lifecycle: &AlertLifecycle,
) -> anyhow::Result<usize> {
    let count = store.len().await?;
    if count > 0 {
        tracing::info!(count, "Alert store not empty, skipping sample alerts");
        return Ok(0);
    }

    let now = Utc::now();
    let mut inserted = 0usize;

    for def in SAMPLE_ALERTS {
        let req = NewAlert {
            name: Some(def.name.to_string()),
            alert_type: Some(SAMPLE_TYPE.to_string()),
            level: Some(def.level.to_string()),
            status: Some(def.status.to_string()),
            description: Some(def.description.to_string()),
            source: Some(SAMPLE_SOURCE.to_string()),
            rule: Some(def.rule.to_string()),
            value: Some(def.value.to_string()),
            threshold: Some(def.threshold.to_string()),
            begin_time: Some(format_time(&(now - Duration::minutes(def.begin_ago_mins)))),
            end_time: Some(format_time(&(now - Duration::minutes(def.end_ago_mins)))),
            ..Default::default()
        };
        match lifecycle.create(req).await {
            Ok(_) => inserted += 1,
            Err(e) => {
                tracing::error!(name = def.name, error = %e, "Failed to insert sample alert");
            }
        }
    }

    tracing::info!(
        inserted,
        total = SAMPLE_ALERTS.len(),
        "Sample alerts initialized"
    );
    Ok(inserted)
}
