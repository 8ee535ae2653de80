use alertdesk_common::types::{Alert, AlertLevel, AlertStatus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Which timestamp a [`TimeWindow`] tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeField {
    #[default]
    CreateTime,
    UpdateTime,
    EndTime,
}

impl std::str::FromStr for TimeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" | "createtime" => Ok(TimeField::CreateTime),
            "update" | "updatetime" => Ok(TimeField::UpdateTime),
            "end" | "endtime" => Ok(TimeField::EndTime),
            _ => Err(format!("unknown time field: {s}")),
        }
    }
}

/// Inclusive `[start, end]` window over one timestamp field.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub field: TimeField,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 告警过滤条件
///
/// 所有条件以 AND 组合，`None` 表示不限制。`*_contains` 为大小写不敏感的子串匹配，
/// `*_eq` 为精确匹配。`keyword` 在固定字段集合上做 OR 匹配。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub status_eq: Option<AlertStatus>,
    pub level_eq: Option<AlertLevel>,
    pub name_contains: Option<String>,
    pub alert_type_contains: Option<String>,
    pub company_contains: Option<String>,
    pub system_name_contains: Option<String>,
    pub task_name_contains: Option<String>,
    pub host_contains: Option<String>,
    pub region_contains: Option<String>,
    pub end_time_gte: Option<DateTime<Utc>>,
    pub end_time_lte: Option<DateTime<Utc>>,
    pub keyword: Option<String>,
    pub time_window: Option<TimeWindow>,
}

impl AlertFilter {
    /// Evaluates the filter against one record. The database backend builds
    /// the equivalent SQL condition; the two must agree.
    pub fn matches(&self, alert: &Alert) -> bool {
        if self.status_eq.is_some_and(|s| s != alert.status) {
            return false;
        }
        if self.level_eq.is_some_and(|l| l != alert.level) {
            return false;
        }

        let substring_checks: [(&Option<String>, Option<&str>); 7] = [
            (&self.name_contains, Some(alert.name.as_str())),
            (&self.alert_type_contains, Some(alert.alert_type.as_str())),
            (&self.company_contains, alert.company.as_deref()),
            (&self.system_name_contains, alert.system_name.as_deref()),
            (&self.task_name_contains, alert.task_name.as_deref()),
            (&self.host_contains, alert.host.as_deref()),
            (&self.region_contains, alert.region.as_deref()),
        ];
        for (needle, haystack) in substring_checks {
            if let Some(needle) = needle {
                if !contains_ignore_case(haystack, needle) {
                    return false;
                }
            }
        }

        if let Some(from) = self.end_time_gte {
            if !alert.end_time.is_some_and(|t| t >= from) {
                return false;
            }
        }
        if let Some(to) = self.end_time_lte {
            if !alert.end_time.is_some_and(|t| t <= to) {
                return false;
            }
        }

        if let Some(keyword) = &self.keyword {
            let hit = keyword_fields(alert)
                .into_iter()
                .any(|field| contains_ignore_case(field, keyword));
            if !hit {
                return false;
            }
        }

        if let Some(window) = &self.time_window {
            let value = match window.field {
                TimeField::CreateTime => Some(alert.create_time),
                TimeField::UpdateTime => Some(alert.update_time),
                TimeField::EndTime => alert.end_time,
            };
            if !value.is_some_and(|t| t >= window.start && t <= window.end) {
                return false;
            }
        }

        true
    }
}

/// Fields searched by the full-text keyword, in a fixed order.
fn keyword_fields(alert: &Alert) -> [Option<&str>; 8] {
    [
        Some(alert.name.as_str()),
        Some(alert.description.as_str()),
        Some(alert.alert_type.as_str()),
        Some(alert.source.as_str()),
        alert.company.as_deref(),
        alert.system_name.as_deref(),
        alert.task_name.as_deref(),
        alert.host.as_deref(),
    ]
}

/// ASCII-only case folding, matching SQLite's `LOWER()` and `LIKE`.
/// Non-ASCII letters must match exactly on both backends.
fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| {
        h.to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    })
}

/// Sortable alert fields. Wire names are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    EndTime,
    BeginTime,
    CreateTime,
    UpdateTime,
    RecoverTime,
    Name,
    Type,
    Company,
    SystemName,
    Host,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "endtime" => Ok(SortField::EndTime),
            "begintime" => Ok(SortField::BeginTime),
            "createtime" => Ok(SortField::CreateTime),
            "updatetime" => Ok(SortField::UpdateTime),
            "recovertime" => Ok(SortField::RecoverTime),
            "name" | "caseexecid" => Ok(SortField::Name),
            "type" | "alarmtype" => Ok(SortField::Type),
            "company" => Ok(SortField::Company),
            "systemname" => Ok(SortField::SystemName),
            "host" => Ok(SortField::Host),
            _ => Err(format!("unsupported sort field: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("unsupported sort order: {s}")),
        }
    }
}

/// Ordering for query results. Ties are broken by ascending id; absent
/// values sort before present ones in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl AlertSort {
    pub fn compare(&self, a: &Alert, b: &Alert) -> Ordering {
        let ord = match self.field {
            SortField::EndTime => a.end_time.cmp(&b.end_time),
            SortField::BeginTime => a.begin_time.cmp(&b.begin_time),
            SortField::CreateTime => a.create_time.cmp(&b.create_time),
            SortField::UpdateTime => a.update_time.cmp(&b.update_time),
            SortField::RecoverTime => a.recover_time.cmp(&b.recover_time),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Type => a.alert_type.cmp(&b.alert_type),
            SortField::Company => a.company.cmp(&b.company),
            SortField::SystemName => a.system_name.cmp(&b.system_name),
            SortField::Host => a.host.cmp(&b.host),
        };
        let ord = match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };
        ord.then_with(|| a.id.cmp(&b.id))
    }
}
