//! LLM-callable tool surface over the alert core.
//!
//! Every tool takes a flat JSON object of arguments and answers with
//! human-readable text. Failures are reported in the text with
//! `is_error = true`; nothing here turns a core error into a transport error.

use alertdesk_alert::time::format_time;
use alertdesk_alert::{
    AlertError, AlertLifecycle, AlertListQuery, AlertQueryEngine, AlertStatistics, BatchOutcome,
    Page, PageRequest,
};
use alertdesk_common::types::{Alert, AlertUpdate, NewAlert};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;
use utoipa::ToSchema;

use crate::api::pagination::parse_page_text;

/// 工具参数描述
#[derive(Debug, Clone, Serialize)]
pub struct ToolParam {
    /// 参数名
    pub name: &'static str,
    /// 参数类型（string / integer / array / object）
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// 工具描述
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ToolParam>,
}

/// 工具调用结果
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    pub is_error: bool,
    pub text: String,
}

impl ToolOutput {
    fn ok(text: String) -> Self {
        Self {
            is_error: false,
            text,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: text.into(),
        }
    }
}

const fn param(
    name: &'static str,
    kind: &'static str,
    description: &'static str,
    required: bool,
) -> ToolParam {
    ToolParam {
        name,
        kind,
        description,
        required,
    }
}

const ALERT_ID: ToolParam = param("alertId", "string", "Alert id", true);
const ALERT_IDS: ToolParam = param(
    "alertIds",
    "string",
    "Comma-separated alert ids, e.g. \"1,2,3\"",
    true,
);
const PAGE_NUM: ToolParam = param("pageNum", "integer", "Page number, starting at 1 (default 1)", false);
const PAGE_SIZE: ToolParam = param("pageSize", "integer", "Page size (default 10)", false);

fn alert_field_params(required: bool) -> Vec<ToolParam> {
    vec![
        param("name", "string", "Alert name", required),
        param("type", "string", "Alert type, e.g. host or business", required),
        param(
            "level",
            "string",
            "LOW, MEDIUM, HIGH or CRITICAL (info / warning / critical also accepted)",
            required,
        ),
        param(
            "status",
            "string",
            "ACTIVE, RESOLVED or PENDING (or 0 / 1 / 2)",
            required,
        ),
        param("description", "string", "Alert description", false),
        param("source", "string", "Alert source", false),
        param("company", "string", "Company", false),
        param("systemName", "string", "System name", false),
        param("taskName", "string", "Task name", false),
        param("host", "string", "Host", false),
        param("region", "string", "Region", false),
        param("rule", "string", "Rule that fired", false),
        param("value", "string", "Observed value", false),
        param("threshold", "string", "Threshold", false),
        param("aveTime", "string", "Average time over the window", false),
        param("actualValue", "string", "Actual measured value", false),
        param("beginTime", "string", "Begin time, yyyy-MM-dd HH:mm:ss", false),
        param("endTime", "string", "End time, yyyy-MM-dd HH:mm:ss", false),
    ]
}

fn catalogue() -> Vec<ToolSpec> {
    let mut update_params = vec![ALERT_ID];
    update_params.extend(alert_field_params(false));

    vec![
        ToolSpec {
            name: "query_alert",
            description: "Get the full details of one alert by id.",
            parameters: vec![ALERT_ID],
        },
        ToolSpec {
            name: "query_alert_list",
            description: "List alerts matching optional filters, sorted and paginated.",
            parameters: vec![
                param("status", "string", "ACTIVE, RESOLVED or PENDING", false),
                param("level", "string", "LOW, MEDIUM, HIGH or CRITICAL", false),
                param("type", "string", "Alert type (substring)", false),
                param("company", "string", "Company (substring)", false),
                param("systemName", "string", "System name (substring)", false),
                param("taskName", "string", "Task name (substring)", false),
                param("host", "string", "Host (substring)", false),
                param("region", "string", "Region (substring)", false),
                param("name", "string", "Alert name (substring)", false),
                param("beginTime", "string", "Lower bound on endTime", false),
                param("endTime", "string", "Upper bound on endTime", false),
                param("sortField", "string", "Sort field (default endTime)", false),
                param("sortOrder", "string", "asc or desc (default desc)", false),
                PAGE_NUM,
                PAGE_SIZE,
            ],
        },
        ToolSpec {
            name: "insert_alert",
            description: "Create a new alert.",
            parameters: alert_field_params(true),
        },
        ToolSpec {
            name: "batch_insert_alerts",
            description: "Create several alerts at once; invalid entries are skipped and reported.",
            parameters: vec![param(
                "alerts",
                "array",
                "List of alert objects with the same fields as insert_alert",
                true,
            )],
        },
        ToolSpec {
            name: "update_alert",
            description: "Update the given fields of an alert; omitted or blank fields are kept.",
            parameters: update_params,
        },
        ToolSpec {
            name: "delete_alert",
            description: "Delete one alert by id.",
            parameters: vec![ALERT_ID],
        },
        ToolSpec {
            name: "batch_delete_alerts",
            description: "Delete several alerts; ids that do not exist are reported.",
            parameters: vec![ALERT_IDS],
        },
        ToolSpec {
            name: "resolve_alert",
            description: "Mark an alert as RESOLVED and record its recover time.",
            parameters: vec![ALERT_ID],
        },
        ToolSpec {
            name: "activate_alert",
            description: "Mark an alert as ACTIVE again.",
            parameters: vec![ALERT_ID],
        },
        ToolSpec {
            name: "escalate_alert",
            description: "Raise an alert's level by one step (LOW → MEDIUM → HIGH → CRITICAL).",
            parameters: vec![ALERT_ID],
        },
        ToolSpec {
            name: "batch_update_alert_status",
            description: "Set the status of several alerts at once.",
            parameters: vec![
                ALERT_IDS,
                param(
                    "targetStatus",
                    "string",
                    "ACTIVE, RESOLVED or PENDING (or 0 / 1 / 2)",
                    true,
                ),
            ],
        },
        ToolSpec {
            name: "get_alert_statistics",
            description: "Count alerts grouped by status, level, type, company and system.",
            parameters: Vec::new(),
        },
        ToolSpec {
            name: "search_alerts",
            description: "Full-text search over name, description, type, source, company, system, task and host.",
            parameters: vec![
                param("keyword", "string", "Text to look for", true),
                PAGE_NUM,
                PAGE_SIZE,
            ],
        },
        ToolSpec {
            name: "get_alerts_by_time_range",
            description: "List alerts whose create, update or end time falls in a range.",
            parameters: vec![
                param("startTime", "string", "Range start, yyyy-MM-dd HH:mm:ss", true),
                param("endTime", "string", "Range end, yyyy-MM-dd HH:mm:ss", true),
                param(
                    "timeField",
                    "string",
                    "CREATE (default), UPDATE or END",
                    false,
                ),
                PAGE_NUM,
                PAGE_SIZE,
            ],
        },
    ]
}

// ---- argument helpers ----

/// Text value of `key`; numbers are accepted and rendered, blanks are absent.
fn arg_str(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn arg_page_value(args: &Value, key: &str) -> Result<Option<i64>, AlertError> {
    match args.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| AlertError::validation(format!("{key} must be an integer"))),
        Some(Value::String(s)) => parse_page_text(key, s),
        _ => Ok(None),
    }
}

fn arg_page(args: &Value) -> Result<PageRequest, AlertError> {
    Ok(PageRequest::new(
        arg_page_value(args, "pageNum")?,
        arg_page_value(args, "pageSize")?,
    ))
}

/// Comma-separated id list; a JSON array of ids is accepted too.
fn arg_ids(args: &Value, key: &str) -> Vec<String> {
    match args.get(key) {
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn list_query(args: &Value) -> AlertListQuery {
    AlertListQuery {
        status: arg_str(args, "status"),
        level: arg_str(args, "level"),
        alert_type: arg_str(args, "type"),
        company: arg_str(args, "company"),
        system_name: arg_str(args, "systemName"),
        task_name: arg_str(args, "taskName"),
        host: arg_str(args, "host"),
        region: arg_str(args, "region"),
        name: arg_str(args, "name"),
        begin_time: arg_str(args, "beginTime"),
        end_time: arg_str(args, "endTime"),
        sort_field: arg_str(args, "sortField"),
        sort_order: arg_str(args, "sortOrder"),
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, AlertError> {
    serde_json::from_value(args).map_err(|e| AlertError::validation(format!("invalid arguments: {e}")))
}

// ---- rendering ----

fn push_opt(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        let _ = writeln!(out, "  {label}: {v}");
    }
}

fn render_alert(alert: &Alert) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Alert {}", alert.id);
    let _ = writeln!(out, "  Name: {}", alert.name);
    let _ = writeln!(out, "  Type: {}", alert.alert_type);
    let _ = writeln!(out, "  Level: {}", alert.level);
    let _ = writeln!(out, "  Status: {}", alert.status);
    let _ = writeln!(out, "  Description: {}", alert.description);
    let _ = writeln!(out, "  Source: {}", alert.source);
    push_opt(&mut out, "Company", alert.company.as_deref());
    push_opt(&mut out, "System", alert.system_name.as_deref());
    push_opt(&mut out, "Task", alert.task_name.as_deref());
    push_opt(&mut out, "Host", alert.host.as_deref());
    push_opt(&mut out, "Region", alert.region.as_deref());
    push_opt(&mut out, "Rule", alert.rule.as_deref());
    push_opt(&mut out, "Value", alert.value.as_deref());
    push_opt(&mut out, "Threshold", alert.threshold.as_deref());
    push_opt(&mut out, "Average time", alert.ave_time.as_deref());
    push_opt(&mut out, "Actual value", alert.actual_value.as_deref());
    let _ = writeln!(out, "  Recovered: {}", if alert.is_recover { "yes" } else { "no" });
    let _ = writeln!(out, "  Created: {}", format_time(&alert.create_time));
    let _ = writeln!(out, "  Updated: {}", format_time(&alert.update_time));
    push_opt(&mut out, "Begin", alert.begin_time.map(|t| format_time(&t)).as_deref());
    push_opt(&mut out, "End", alert.end_time.map(|t| format_time(&t)).as_deref());
    push_opt(
        &mut out,
        "Recover time",
        alert.recover_time.map(|t| format_time(&t)).as_deref(),
    );
    out.trim_end().to_string()
}

fn render_page(page: &Page<Alert>) -> String {
    let mut out = format!(
        "Found {} alert(s), page {}/{} (page size {})",
        page.total,
        page.page_num,
        page.total_pages(),
        page.page_size
    );
    if page.data.is_empty() {
        out.push_str("\nNo alerts on this page.");
        return out;
    }
    for alert in &page.data {
        let end = alert
            .end_time
            .map(|t| format_time(&t))
            .unwrap_or_else(|| "-".to_string());
        let _ = write!(
            out,
            "\n- [{}] {} (id {}) status={} type={} end={}",
            alert.level, alert.name, alert.id, alert.status, alert.alert_type, end
        );
    }
    out
}

fn render_batch(verb: &str, outcome: &BatchOutcome) -> String {
    let mut out = format!("{verb} {} alert(s)", outcome.succeeded.len());
    if !outcome.succeeded.is_empty() {
        let _ = write!(out, ": {}", outcome.succeeded.join(", "));
    }
    if !outcome.not_found.is_empty() {
        let _ = write!(out, "\nNot found: {}", outcome.not_found.join(", "));
    }
    out
}

fn render_counts(out: &mut String, title: &str, counts: &BTreeMap<String, u64>) {
    let _ = write!(out, "\n{title}:");
    for (key, count) in counts {
        let _ = write!(out, "\n  {key}: {count}");
    }
}

fn render_statistics(stats: &AlertStatistics) -> String {
    let mut out = format!("Total alerts: {}", stats.total);
    render_counts(&mut out, "By status", &stats.by_status);
    render_counts(&mut out, "By level", &stats.by_level);
    render_counts(&mut out, "By type", &stats.by_type);
    render_counts(&mut out, "By company", &stats.by_company);
    render_counts(&mut out, "By system", &stats.by_system);
    out
}

fn render_error(err: &AlertError) -> String {
    match err {
        AlertError::Storage(e) => {
            tracing::error!(error = %e, "Alert storage failure during tool call");
            "Error: the alert store is unavailable, please try again later".to_string()
        }
        other => format!("Error: {other}"),
    }
}

/// 告警工具集：工具目录与调用分发
#[derive(Clone)]
pub struct AlertToolbox {
    query: AlertQueryEngine,
    lifecycle: AlertLifecycle,
}

impl AlertToolbox {
    pub fn new(query: AlertQueryEngine, lifecycle: AlertLifecycle) -> Self {
        Self { query, lifecycle }
    }

    pub fn catalogue(&self) -> Vec<ToolSpec> {
        catalogue()
    }

    /// Runs the named tool. Returns `None` for an unknown tool name.
    pub async fn dispatch(&self, name: &str, args: Value) -> Option<ToolOutput> {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        let result = match name {
            "query_alert" => self.query_alert(&args).await,
            "query_alert_list" => self.query_alert_list(&args).await,
            "insert_alert" => self.insert_alert(args).await,
            "batch_insert_alerts" => self.batch_insert_alerts(args).await,
            "update_alert" => self.update_alert(args).await,
            "delete_alert" => self.delete_alert(&args).await,
            "batch_delete_alerts" => self.batch_delete_alerts(&args).await,
            "resolve_alert" => self.resolve_alert(&args).await,
            "activate_alert" => self.activate_alert(&args).await,
            "escalate_alert" => self.escalate_alert(&args).await,
            "batch_update_alert_status" => self.batch_update_alert_status(&args).await,
            "get_alert_statistics" => self.get_alert_statistics().await,
            "search_alerts" => self.search_alerts(&args).await,
            "get_alerts_by_time_range" => self.get_alerts_by_time_range(&args).await,
            _ => return None,
        };
        tracing::debug!(tool = %name, ok = result.is_ok(), "Tool call finished");
        Some(match result {
            Ok(text) => ToolOutput::ok(text),
            Err(e) => ToolOutput::error(render_error(&e)),
        })
    }

    async fn query_alert(&self, args: &Value) -> Result<String, AlertError> {
        let id = arg_str(args, "alertId").unwrap_or_default();
        let alert = self.query.get(&id).await?;
        Ok(render_alert(&alert))
    }

    async fn query_alert_list(&self, args: &Value) -> Result<String, AlertError> {
        let page = arg_page(args)?;
        let result = self.query.list(&list_query(args), page).await?;
        Ok(render_page(&result))
    }

    async fn insert_alert(&self, args: Value) -> Result<String, AlertError> {
        let req: NewAlert = parse_args(args)?;
        let alert = self.lifecycle.create(req).await?;
        Ok(format!("Alert created.\n{}", render_alert(&alert)))
    }

    async fn batch_insert_alerts(&self, args: Value) -> Result<String, AlertError> {
        let items = match args {
            Value::Array(items) => Value::Array(items),
            mut obj => obj
                .get_mut("alerts")
                .map(Value::take)
                .ok_or_else(|| AlertError::validation("alerts is required"))?,
        };
        let reqs: Vec<NewAlert> = parse_args(items)?;
        let outcome = self.lifecycle.create_batch(reqs).await?;

        let mut out = format!("Inserted {} alert(s)", outcome.inserted.len());
        for alert in &outcome.inserted {
            let _ = write!(out, "\n- {} (id {})", alert.name, alert.id);
        }
        if !outcome.rejected.is_empty() {
            let _ = write!(out, "\nRejected {} entry(ies):", outcome.rejected.len());
            for rejected in &outcome.rejected {
                let _ = write!(out, "\n- #{}: {}", rejected.index, rejected.reason);
            }
        }
        Ok(out)
    }

    async fn update_alert(&self, args: Value) -> Result<String, AlertError> {
        let id = arg_str(&args, "alertId").unwrap_or_default();
        let req: AlertUpdate = parse_args(args)?;
        let alert = self.lifecycle.update(&id, req).await?;
        Ok(format!("Alert updated.\n{}", render_alert(&alert)))
    }

    async fn delete_alert(&self, args: &Value) -> Result<String, AlertError> {
        let id = arg_str(args, "alertId").unwrap_or_default();
        let alert = self.lifecycle.delete(&id).await?;
        Ok(format!("Deleted alert {} ({})", alert.id, alert.name))
    }

    async fn batch_delete_alerts(&self, args: &Value) -> Result<String, AlertError> {
        let outcome = self.lifecycle.delete_batch(&arg_ids(args, "alertIds")).await?;
        Ok(render_batch("Deleted", &outcome))
    }

    async fn resolve_alert(&self, args: &Value) -> Result<String, AlertError> {
        let id = arg_str(args, "alertId").unwrap_or_default();
        let alert = self.lifecycle.resolve(&id).await?;
        Ok(format!("Alert resolved.\n{}", render_alert(&alert)))
    }

    async fn activate_alert(&self, args: &Value) -> Result<String, AlertError> {
        let id = arg_str(args, "alertId").unwrap_or_default();
        let alert = self.lifecycle.activate(&id).await?;
        Ok(format!("Alert activated.\n{}", render_alert(&alert)))
    }

    async fn escalate_alert(&self, args: &Value) -> Result<String, AlertError> {
        let id = arg_str(args, "alertId").unwrap_or_default();
        let escalation = self.lifecycle.escalate(&id).await?;
        Ok(format!(
            "Alert escalated from {} to {}.\n{}",
            escalation.from,
            escalation.to,
            render_alert(&escalation.alert)
        ))
    }

    async fn batch_update_alert_status(&self, args: &Value) -> Result<String, AlertError> {
        let status = arg_str(args, "targetStatus")
            .or_else(|| arg_str(args, "status"))
            .unwrap_or_default();
        let outcome = self
            .lifecycle
            .batch_update_status(&arg_ids(args, "alertIds"), &status)
            .await?;
        Ok(render_batch("Updated status of", &outcome))
    }

    async fn get_alert_statistics(&self) -> Result<String, AlertError> {
        let stats = self.query.statistics().await?;
        Ok(render_statistics(&stats))
    }

    async fn search_alerts(&self, args: &Value) -> Result<String, AlertError> {
        let keyword = arg_str(args, "keyword").unwrap_or_default();
        let page = arg_page(args)?;
        let result = self.query.search(&keyword, page).await?;
        Ok(render_page(&result))
    }

    async fn get_alerts_by_time_range(&self, args: &Value) -> Result<String, AlertError> {
        let start = arg_str(args, "startTime").unwrap_or_default();
        let end = arg_str(args, "endTime").unwrap_or_default();
        let time_field = arg_str(args, "timeField");
        let page = arg_page(args)?;
        let result = self
            .query
            .time_range(&start, &end, time_field.as_deref(), page)
            .await?;
        Ok(render_page(&result))
    }
}
