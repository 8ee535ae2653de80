use crate::api::pagination::PageParams;
use crate::api::{alert_error_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use alertdesk_alert::AlertListQuery;
use alertdesk_common::types::{Alert, AlertLevel, AlertStatus, AlertUpdate, NewAlert};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 告警列表查询参数
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
struct AlertListParams {
    /// 状态精确匹配（ACTIVE / RESOLVED / PENDING 或 0 / 1 / 2）
    #[param(required = false)]
    status: Option<String>,
    /// 级别精确匹配（LOW / MEDIUM / HIGH / CRITICAL）
    #[param(required = false)]
    level: Option<String>,
    /// 类型模糊匹配
    #[param(required = false)]
    #[serde(rename = "type")]
    alert_type: Option<String>,
    /// 公司模糊匹配
    #[param(required = false)]
    company: Option<String>,
    /// 系统名称模糊匹配
    #[param(required = false)]
    system_name: Option<String>,
    /// 任务名称模糊匹配
    #[param(required = false)]
    task_name: Option<String>,
    /// 主机模糊匹配
    #[param(required = false)]
    host: Option<String>,
    /// 区域模糊匹配
    #[param(required = false)]
    region: Option<String>,
    /// 名称模糊匹配
    #[param(required = false)]
    #[serde(alias = "caseExecId")]
    name: Option<String>,
    /// endTime 下界（yyyy-MM-dd HH:mm:ss）
    #[param(required = false)]
    begin_time: Option<String>,
    /// endTime 上界（yyyy-MM-dd HH:mm:ss）
    #[param(required = false)]
    end_time: Option<String>,
    /// 排序字段（默认 endTime）
    #[param(required = false)]
    sort_field: Option<String>,
    /// 排序方向 asc / desc（默认 desc）
    #[param(required = false)]
    sort_order: Option<String>,
}

impl From<AlertListParams> for AlertListQuery {
    fn from(p: AlertListParams) -> Self {
        Self {
            status: p.status,
            level: p.level,
            alert_type: p.alert_type,
            company: p.company,
            system_name: p.system_name,
            task_name: p.task_name,
            host: p.host,
            region: p.region,
            name: p.name,
            begin_time: p.begin_time,
            end_time: p.end_time,
            sort_field: p.sort_field,
            sort_order: p.sort_order,
        }
    }
}

/// 分页查询告警列表。
/// 默认排序：`endTime` 倒序；默认分页：`pageNum=1&pageSize=10`。
#[utoipa::path(
    get,
    path = "/v1/alerts",
    tag = "Alerts",
    params(AlertListParams, PageParams),
    responses(
        (status = 200, description = "告警分页列表（data / total / pageNum / pageSize）"),
        (status = 400, description = "参数错误", body = ApiError)
    )
)]
async fn list_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
    Query(page): Query<PageParams>,
) -> impl IntoResponse {
    let page = match page.page_request() {
        Ok(p) => p,
        Err(e) => return alert_error_response(&trace_id, &e),
    };
    let query = AlertListQuery::from(params);
    match state.query.list(&query, page).await {
        Ok(result) => success_response(StatusCode::OK, &trace_id, result),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 新建告警。
#[utoipa::path(
    post,
    path = "/v1/alerts",
    tag = "Alerts",
    request_body = NewAlert,
    responses(
        (status = 201, description = "告警已创建", body = Alert),
        (status = 400, description = "参数错误", body = ApiError)
    )
)]
async fn create_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<NewAlert>,
) -> impl IntoResponse {
    match state.lifecycle.create(req).await {
        Ok(alert) => success_response(StatusCode::CREATED, &trace_id, alert),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 获取单条告警详情。
#[utoipa::path(
    get,
    path = "/v1/alerts/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    responses(
        (status = 200, description = "告警详情", body = Alert),
        (status = 404, description = "告警不存在", body = ApiError)
    )
)]
async fn get_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.query.get(&id).await {
        Ok(alert) => success_response(StatusCode::OK, &trace_id, alert),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 更新告警，仅非空字段生效。
#[utoipa::path(
    put,
    path = "/v1/alerts/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    request_body = AlertUpdate,
    responses(
        (status = 200, description = "更新后的告警", body = Alert),
        (status = 400, description = "参数错误", body = ApiError),
        (status = 404, description = "告警不存在", body = ApiError)
    )
)]
async fn update_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AlertUpdate>,
) -> impl IntoResponse {
    match state.lifecycle.update(&id, req).await {
        Ok(alert) => success_response(StatusCode::OK, &trace_id, alert),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 删除告警，返回被删除的记录。
#[utoipa::path(
    delete,
    path = "/v1/alerts/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    responses(
        (status = 200, description = "已删除的告警", body = Alert),
        (status = 404, description = "告警不存在", body = ApiError)
    )
)]
async fn delete_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.lifecycle.delete(&id).await {
        Ok(alert) => success_response(StatusCode::OK, &trace_id, alert),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 批量新建告警；无效条目被跳过并在 `rejected` 中返回其下标与原因。
#[utoipa::path(
    post,
    path = "/v1/alerts/batch",
    tag = "Alerts",
    request_body = Vec<NewAlert>,
    responses(
        (status = 200, description = "批量写入结果（inserted / rejected）"),
        (status = 400, description = "请求为空", body = ApiError)
    )
)]
async fn batch_create_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(reqs): Json<Vec<NewAlert>>,
) -> impl IntoResponse {
    match state.lifecycle.create_batch(reqs).await {
        Ok(outcome) => success_response(StatusCode::OK, &trace_id, outcome),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 批量操作的告警 ID 列表
#[derive(Debug, Deserialize, ToSchema)]
struct BatchIdsRequest {
    /// 告警 ID 列表（去除首尾空白与重复项）
    ids: Vec<String>,
}

/// 批量删除告警；不存在的 ID 列在 `notFound` 中，不影响其余删除。
#[utoipa::path(
    delete,
    path = "/v1/alerts/batch",
    tag = "Alerts",
    request_body = BatchIdsRequest,
    responses(
        (status = 200, description = "批量删除结果（succeeded / notFound）"),
        (status = 400, description = "ID 列表为空", body = ApiError)
    )
)]
async fn batch_delete_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<BatchIdsRequest>,
) -> impl IntoResponse {
    match state.lifecycle.delete_batch(&req.ids).await {
        Ok(outcome) => success_response(StatusCode::OK, &trace_id, outcome),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 批量修改状态请求
#[derive(Debug, Deserialize, ToSchema)]
struct BatchStatusRequest {
    /// 告警 ID 列表
    ids: Vec<String>,
    /// 目标状态（ACTIVE / RESOLVED / PENDING 或 0 / 1 / 2）
    #[serde(default, deserialize_with = "alertdesk_common::types::deserialize_optional_text")]
    #[schema(value_type = String)]
    status: Option<String>,
}

/// 批量修改告警状态。
#[utoipa::path(
    put,
    path = "/v1/alerts/batch/status",
    tag = "Alerts",
    request_body = BatchStatusRequest,
    responses(
        (status = 200, description = "批量更新结果（succeeded / notFound）"),
        (status = 400, description = "参数错误", body = ApiError)
    )
)]
async fn batch_update_status(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<BatchStatusRequest>,
) -> impl IntoResponse {
    let status = req.status.unwrap_or_default();
    match state.lifecycle.batch_update_status(&req.ids, &status).await {
        Ok(outcome) => success_response(StatusCode::OK, &trace_id, outcome),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 全文检索参数
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
struct SearchParams {
    /// 关键字（匹配名称、描述、类型、来源、公司、系统、任务、主机）
    #[param(required = true)]
    #[serde(default)]
    keyword: String,
}

/// 按关键字全文检索告警。
#[utoipa::path(
    get,
    path = "/v1/alerts/search",
    tag = "Alerts",
    params(SearchParams, PageParams),
    responses(
        (status = 200, description = "检索结果分页"),
        (status = 400, description = "关键字为空", body = ApiError)
    )
)]
async fn search_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    Query(page): Query<PageParams>,
) -> impl IntoResponse {
    let page = match page.page_request() {
        Ok(p) => p,
        Err(e) => return alert_error_response(&trace_id, &e),
    };
    match state.query.search(&params.keyword, page).await {
        Ok(result) => success_response(StatusCode::OK, &trace_id, result),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 时间范围查询参数
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
struct TimeRangeParams {
    /// 起始时间（yyyy-MM-dd HH:mm:ss）
    #[param(required = true)]
    #[serde(default)]
    start_time: String,
    /// 结束时间（yyyy-MM-dd HH:mm:ss）
    #[param(required = true)]
    #[serde(default)]
    end_time: String,
    /// 时间字段：CREATE（默认）/ UPDATE / END
    #[param(required = false)]
    time_field: Option<String>,
}

/// 查询指定时间字段落在区间内的告警，按该字段倒序。
#[utoipa::path(
    get,
    path = "/v1/alerts/time-range",
    tag = "Alerts",
    params(TimeRangeParams, PageParams),
    responses(
        (status = 200, description = "时间范围内的告警分页"),
        (status = 400, description = "时间格式错误或起止颠倒", body = ApiError)
    )
)]
async fn alerts_by_time_range(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<TimeRangeParams>,
    Query(page): Query<PageParams>,
) -> impl IntoResponse {
    let page = match page.page_request() {
        Ok(p) => p,
        Err(e) => return alert_error_response(&trace_id, &e),
    };
    match state
        .query
        .time_range(
            &params.start_time,
            &params.end_time,
            params.time_field.as_deref(),
            page,
        )
        .await
    {
        Ok(result) => success_response(StatusCode::OK, &trace_id, result),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 告警统计：总数及按状态、级别、类型、公司、系统分组计数。
#[utoipa::path(
    get,
    path = "/v1/alerts/statistics",
    tag = "Alerts",
    responses(
        (status = 200, description = "统计结果（total / byStatus / byLevel / byType / byCompany / bySystem）")
    )
)]
async fn alert_statistics(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.query.statistics().await {
        Ok(stats) => success_response(StatusCode::OK, &trace_id, stats),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 告警级别选项（按升级顺序）。
#[utoipa::path(
    get,
    path = "/v1/alerts/options/levels",
    tag = "Alerts",
    responses((status = 200, description = "级别列表", body = Vec<AlertLevel>))
)]
async fn level_options(Extension(trace_id): Extension<TraceId>) -> impl IntoResponse {
    success_response(StatusCode::OK, &trace_id, AlertLevel::LADDER.to_vec())
}

/// 告警类型选项：默认类型与已出现的类型。
#[utoipa::path(
    get,
    path = "/v1/alerts/options/types",
    tag = "Alerts",
    responses((status = 200, description = "类型列表", body = Vec<String>))
)]
async fn type_options(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.query.alert_types().await {
        Ok(types) => success_response(StatusCode::OK, &trace_id, types),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 状态选项
#[derive(Serialize, ToSchema)]
struct StatusOption {
    /// 数字编码
    code: i64,
    /// 状态名
    name: AlertStatus,
}

/// 告警状态选项。
#[utoipa::path(
    get,
    path = "/v1/alerts/options/statuses",
    tag = "Alerts",
    responses((status = 200, description = "状态列表", body = Vec<StatusOption>))
)]
async fn status_options(Extension(trace_id): Extension<TraceId>) -> impl IntoResponse {
    let options: Vec<StatusOption> = AlertStatus::ALL
        .iter()
        .map(|s| StatusOption {
            code: s.code(),
            name: *s,
        })
        .collect();
    success_response(StatusCode::OK, &trace_id, options)
}

/// 将告警标记为已恢复（RESOLVED）。
#[utoipa::path(
    put,
    path = "/v1/alerts/{id}/resolve",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    responses(
        (status = 200, description = "已恢复的告警", body = Alert),
        (status = 404, description = "告警不存在", body = ApiError)
    )
)]
async fn resolve_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.lifecycle.resolve(&id).await {
        Ok(alert) => success_response(StatusCode::OK, &trace_id, alert),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 将告警重新激活（ACTIVE）。
#[utoipa::path(
    put,
    path = "/v1/alerts/{id}/activate",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    responses(
        (status = 200, description = "已激活的告警", body = Alert),
        (status = 404, description = "告警不存在", body = ApiError)
    )
)]
async fn activate_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.lifecycle.activate(&id).await {
        Ok(alert) => success_response(StatusCode::OK, &trace_id, alert),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

/// 告警升级结果
#[derive(Serialize, ToSchema)]
struct EscalationResponse {
    alert: Alert,
    from: AlertLevel,
    to: AlertLevel,
}

/// 告警级别上调一级；已是 CRITICAL 时返回 409。
#[utoipa::path(
    put,
    path = "/v1/alerts/{id}/escalate",
    tag = "Alerts",
    params(("id" = String, Path, description = "告警 ID")),
    responses(
        (status = 200, description = "升级结果", body = EscalationResponse),
        (status = 404, description = "告警不存在", body = ApiError),
        (status = 409, description = "已是最高级别", body = ApiError)
    )
)]
async fn escalate_alert(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.lifecycle.escalate(&id).await {
        Ok(e) => success_response(
            StatusCode::OK,
            &trace_id,
            EscalationResponse {
                alert: e.alert,
                from: e.from,
                to: e.to,
            },
        ),
        Err(e) => alert_error_response(&trace_id, &e),
    }
}

pub fn alert_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_alerts, create_alert))
        .routes(routes!(batch_create_alerts, batch_delete_alerts))
        .routes(routes!(batch_update_status))
        .routes(routes!(search_alerts))
        .routes(routes!(alerts_by_time_range))
        .routes(routes!(alert_statistics))
        .routes(routes!(level_options))
        .routes(routes!(type_options))
        .routes(routes!(status_options))
        .routes(routes!(get_alert, update_alert, delete_alert))
        .routes(routes!(resolve_alert))
        .routes(routes!(activate_alert))
        .routes(routes!(escalate_alert))
}
