use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Placeholder stored when an alert is created without a description.
pub const DEFAULT_DESCRIPTION: &str = "no description";

/// Placeholder stored when an alert is created without a source.
pub const DEFAULT_SOURCE: &str = "system";

/// Alert severity level, ordered from lowest to highest.
///
/// The canonical ladder has four tiers. The three-tier vocabulary used by
/// ops-monitoring feeds (`info` / `warning` / `critical`) parses onto it.
///
/// # Examples
///
/// ```
/// use alertdesk_common::types::AlertLevel;
///
/// let level: AlertLevel = "warning".parse().unwrap();
/// assert_eq!(level, AlertLevel::Medium);
/// assert_eq!(level.to_string(), "MEDIUM");
/// assert_eq!(level.next(), Some(AlertLevel::High));
/// assert!(AlertLevel::Critical > AlertLevel::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    /// Every level in escalation order.
    pub const LADDER: [AlertLevel; 4] = [
        AlertLevel::Low,
        AlertLevel::Medium,
        AlertLevel::High,
        AlertLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "LOW",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
            AlertLevel::Critical => "CRITICAL",
        }
    }

    /// The next rung up the ladder, or `None` at the top.
    pub fn next(self) -> Option<AlertLevel> {
        match self {
            AlertLevel::Low => Some(AlertLevel::Medium),
            AlertLevel::Medium => Some(AlertLevel::High),
            AlertLevel::High => Some(AlertLevel::Critical),
            AlertLevel::Critical => None,
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "info" => Ok(AlertLevel::Low),
            "medium" | "warning" => Ok(AlertLevel::Medium),
            "high" => Ok(AlertLevel::High),
            "critical" => Ok(AlertLevel::Critical),
            _ => Err(format!("unknown alert level: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for AlertLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(DeError::custom)
    }
}

/// Alert processing status.
///
/// Serialized as `ACTIVE` / `RESOLVED` / `PENDING`. Parsing also accepts the
/// integer codes used by the ops-monitoring feed: 0=ACTIVE, 1=RESOLVED,
/// 2=PENDING.
///
/// # Examples
///
/// ```
/// use alertdesk_common::types::AlertStatus;
///
/// assert_eq!("resolved".parse::<AlertStatus>().unwrap(), AlertStatus::Resolved);
/// assert_eq!("2".parse::<AlertStatus>().unwrap(), AlertStatus::Pending);
/// assert_eq!(AlertStatus::Active.code(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    Active,
    Resolved,
    Pending,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 3] = [
        AlertStatus::Active,
        AlertStatus::Resolved,
        AlertStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "ACTIVE",
            AlertStatus::Resolved => "RESOLVED",
            AlertStatus::Pending => "PENDING",
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            AlertStatus::Active => 0,
            AlertStatus::Resolved => 1,
            AlertStatus::Pending => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<AlertStatus> {
        match code {
            0 => Some(AlertStatus::Active),
            1 => Some(AlertStatus::Resolved),
            2 => Some(AlertStatus::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return AlertStatus::from_code(code)
                .ok_or_else(|| format!("unknown alert status code: {code}"));
        }
        match trimmed.to_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "resolved" => Ok(AlertStatus::Resolved),
            "pending" => Ok(AlertStatus::Pending),
            _ => Err(format!("unknown alert status: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for AlertStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match TextInput::deserialize(deserializer)? {
            TextInput::Number(code) => AlertStatus::from_code(code)
                .ok_or_else(|| DeError::custom(format!("unknown alert status code: {code}"))),
            TextInput::Text(text) => text.parse().map_err(DeError::custom),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextInput {
    Number(i64),
    Text(String),
}

/// Accepts a JSON string or number and yields its text form. Request fields
/// such as `status` arrive either way depending on the caller.
pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TextInput>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(TextInput::Number(number)) => Some(number.to_string()),
        Some(TextInput::Text(text)) => Some(text),
    })
}

/// 告警记录
///
/// 字段名（camelCase）即存储列名与接口字段名，不可随意修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// 告警唯一标识
    pub id: String,
    /// 告警名称（运维格式中的 caseExecId）
    #[serde(alias = "caseExecId")]
    pub name: String,
    /// 告警类型，如 host / business
    #[serde(rename = "type", alias = "alarmType")]
    pub alert_type: String,
    /// 告警级别
    #[serde(alias = "alarmLevel")]
    pub level: AlertLevel,
    /// 告警状态
    pub status: AlertStatus,
    /// 告警描述（运维格式中的 failReason）
    #[serde(alias = "failReason")]
    pub description: String,
    /// 告警来源（运维格式中的 layerName）
    #[serde(alias = "layerName")]
    pub source: String,
    /// 所属公司
    #[serde(default)]
    pub company: Option<String>,
    /// 系统名称
    #[serde(default)]
    pub system_name: Option<String>,
    /// 任务名称
    #[serde(default)]
    pub task_name: Option<String>,
    /// 主机
    #[serde(default)]
    pub host: Option<String>,
    /// 区域
    #[serde(default)]
    pub region: Option<String>,
    /// 告警规则
    #[serde(default)]
    pub rule: Option<String>,
    /// 告警值
    #[serde(default)]
    pub value: Option<String>,
    /// 告警阈值
    #[serde(default)]
    pub threshold: Option<String>,
    /// 平均耗时
    #[serde(default)]
    pub ave_time: Option<String>,
    /// 实际值
    #[serde(default)]
    pub actual_value: Option<String>,
    /// 是否已恢复
    #[serde(default)]
    pub is_recover: bool,
    /// 创建时间
    pub create_time: DateTime<Utc>,
    /// 更新时间
    pub update_time: DateTime<Utc>,
    /// 告警开始时间
    #[serde(default)]
    pub begin_time: Option<DateTime<Utc>>,
    /// 告警结束时间（默认排序与时间范围查询字段）
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// 恢复时间
    #[serde(default)]
    pub recover_time: Option<DateTime<Utc>>,
}

impl Alert {
    /// Moves the alert to `status`, keeping the recover flag consistent:
    /// RESOLVED sets `is_recover` and stamps `recover_time`, anything else
    /// clears `is_recover`. `recover_time` of an earlier resolution is kept.
    pub fn apply_status(&mut self, status: AlertStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            AlertStatus::Resolved => {
                self.is_recover = true;
                self.recover_time = Some(now);
            }
            AlertStatus::Active | AlertStatus::Pending => {
                self.is_recover = false;
            }
        }
    }

    /// Refreshes `update_time`, never letting it fall behind `create_time`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.update_time = now.max(self.create_time);
    }
}

/// 新建告警请求
///
/// 级别、状态与时间均为原始文本，由核心层统一解析与校验。
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    /// 告警名称（必填）
    #[serde(default, alias = "caseExecId")]
    pub name: Option<String>,
    /// 告警类型（必填）
    #[serde(default, rename = "type", alias = "alarmType")]
    pub alert_type: Option<String>,
    /// 告警级别（必填，LOW / MEDIUM / HIGH / CRITICAL，兼容 info / warning / critical）
    #[serde(default, alias = "alarmLevel")]
    pub level: Option<String>,
    /// 告警状态（必填，ACTIVE / RESOLVED / PENDING 或 0 / 1 / 2）
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub status: Option<String>,
    #[serde(default, alias = "failReason")]
    pub description: Option<String>,
    #[serde(default, alias = "layerName")]
    pub source: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub system_name: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub threshold: Option<String>,
    #[serde(default)]
    pub ave_time: Option<String>,
    #[serde(default)]
    pub actual_value: Option<String>,
    /// 告警开始时间（yyyy-MM-dd HH:mm:ss 或 RFC 3339）
    #[serde(default)]
    pub begin_time: Option<String>,
    /// 告警结束时间（yyyy-MM-dd HH:mm:ss 或 RFC 3339）
    #[serde(default)]
    pub end_time: Option<String>,
}

/// 更新告警请求
///
/// 仅非空字段生效；空白字符串视为未提供。
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertUpdate {
    #[serde(default, alias = "caseExecId")]
    pub name: Option<String>,
    #[serde(default, rename = "type", alias = "alarmType")]
    pub alert_type: Option<String>,
    #[serde(default, alias = "alarmLevel")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub status: Option<String>,
    #[serde(default, alias = "failReason")]
    pub description: Option<String>,
    #[serde(default, alias = "layerName")]
    pub source: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub system_name: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub threshold: Option<String>,
    #[serde(default)]
    pub ave_time: Option<String>,
    #[serde(default)]
    pub actual_value: Option<String>,
    #[serde(default)]
    pub begin_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Alert {
        let now = Utc::now();
        Alert {
            id: "1".into(),
            name: "CPU usage".into(),
            alert_type: "host".into(),
            level: AlertLevel::High,
            status: AlertStatus::Active,
            description: DEFAULT_DESCRIPTION.into(),
            source: DEFAULT_SOURCE.into(),
            company: None,
            system_name: None,
            task_name: None,
            host: Some("web-01".into()),
            region: None,
            rule: None,
            value: None,
            threshold: None,
            ave_time: None,
            actual_value: None,
            is_recover: false,
            create_time: now,
            update_time: now,
            begin_time: None,
            end_time: None,
            recover_time: None,
        }
    }

    #[test]
    fn level_parses_both_vocabularies() {
        assert_eq!("LOW".parse::<AlertLevel>().unwrap(), AlertLevel::Low);
        assert_eq!("info".parse::<AlertLevel>().unwrap(), AlertLevel::Low);
        assert_eq!(" High ".parse::<AlertLevel>().unwrap(), AlertLevel::High);
        assert_eq!("Critical".parse::<AlertLevel>().unwrap(), AlertLevel::Critical);
        assert!("severe".parse::<AlertLevel>().is_err());
    }

    #[test]
    fn level_ladder_is_strictly_increasing() {
        for pair in AlertLevel::LADDER.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(AlertLevel::Critical.next(), None);
    }

    #[test]
    fn status_parses_names_and_codes() {
        assert_eq!("active".parse::<AlertStatus>().unwrap(), AlertStatus::Active);
        assert_eq!("1".parse::<AlertStatus>().unwrap(), AlertStatus::Resolved);
        assert!("3".parse::<AlertStatus>().is_err());
        assert!("closed".parse::<AlertStatus>().is_err());
        for status in AlertStatus::ALL {
            assert_eq!(AlertStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn status_deserializes_from_number_or_string() {
        let from_num: AlertStatus = serde_json::from_str("2").unwrap();
        let from_text: AlertStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert_eq!(from_num, AlertStatus::Pending);
        assert_eq!(from_text, AlertStatus::Resolved);
        assert!(serde_json::from_str::<AlertStatus>("7").is_err());
    }

    #[test]
    fn alert_serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "host");
        assert_eq!(json["level"], "HIGH");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["isRecover"], false);
        assert!(json.get("createTime").is_some());
        assert!(json.get("systemName").is_some());
    }

    #[test]
    fn new_alert_accepts_ops_aliases() {
        let req: NewAlert = serde_json::from_value(serde_json::json!({
            "caseExecId": "case-7",
            "alarmType": "business",
            "alarmLevel": "warning",
            "status": 0,
            "failReason": "timeout",
            "systemName": "billing"
        }))
        .unwrap();
        assert_eq!(req.name.as_deref(), Some("case-7"));
        assert_eq!(req.alert_type.as_deref(), Some("business"));
        assert_eq!(req.level.as_deref(), Some("warning"));
        assert_eq!(req.status.as_deref(), Some("0"));
        assert_eq!(req.description.as_deref(), Some("timeout"));
        assert_eq!(req.system_name.as_deref(), Some("billing"));
    }

    #[test]
    fn apply_status_keeps_recover_flag_consistent() {
        let mut alert = sample();
        let later = alert.create_time + Duration::seconds(5);
        alert.apply_status(AlertStatus::Resolved, later);
        assert!(alert.is_recover);
        assert_eq!(alert.recover_time, Some(later));

        alert.apply_status(AlertStatus::Active, later);
        assert!(!alert.is_recover);
        assert_eq!(alert.recover_time, Some(later));
    }

    #[test]
    fn touch_never_precedes_create_time() {
        let mut alert = sample();
        let earlier = alert.create_time - Duration::hours(1);
        alert.touch(earlier);
        assert_eq!(alert.update_time, alert.create_time);
    }
}
