use alertdesk_common::types::Alert;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket key used for alerts whose grouped field is absent.
///
/// A stored value that is literally `(none)` is counted in the same bucket;
/// the groupings stay keyed by plain strings so they serialize as JSON maps.
pub const NONE_BUCKET: &str = "(none)";

/// 告警统计结果
///
/// 每个分组的计数之和都等于 `total`。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatistics {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_level: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
    pub by_company: BTreeMap<String, u64>,
    pub by_system: BTreeMap<String, u64>,
}

impl AlertStatistics {
    pub fn from_alerts<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        let mut stats = AlertStatistics::default();
        for alert in alerts {
            stats.total += 1;
            bump(&mut stats.by_status, Some(alert.status.as_str()));
            bump(&mut stats.by_level, Some(alert.level.as_str()));
            bump(&mut stats.by_type, Some(alert.alert_type.as_str()));
            bump(&mut stats.by_company, alert.company.as_deref());
            bump(&mut stats.by_system, alert.system_name.as_deref());
        }
        stats
    }
}

fn bump(counts: &mut BTreeMap<String, u64>, key: Option<&str>) {
    let key = key.unwrap_or(NONE_BUCKET);
    *counts.entry(key.to_string()).or_default() += 1;
}
