use crate::api::{error_response, success_response, ApiError};
use crate::logging::TraceId;
use crate::state::AppState;
use crate::tools::ToolOutput;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 列出可供 LLM 调用的告警工具及其参数。
#[utoipa::path(
    get,
    path = "/v1/tools",
    tag = "Tools",
    responses(
        (status = 200, description = "工具目录（name / description / parameters）")
    )
)]
async fn list_tools(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    success_response(StatusCode::OK, &trace_id, state.tools.catalogue())
}

/// 调用指定工具。业务错误体现在 `isError` 与文本中，HTTP 状态仍为 200。
#[utoipa::path(
    post,
    path = "/v1/tools/{name}",
    tag = "Tools",
    params(("name" = String, Path, description = "工具名，如 query_alert")),
    request_body(content = serde_json::Value, description = "工具参数（JSON 对象）"),
    responses(
        (status = 200, description = "工具输出", body = ToolOutput),
        (status = 404, description = "工具不存在", body = ApiError)
    )
)]
async fn invoke_tool(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(name): Path<String>,
    args: Option<Json<Value>>,
) -> impl IntoResponse {
    let args = args.map(|Json(v)| v).unwrap_or(Value::Null);
    match state.tools.dispatch(&name, args).await {
        Some(output) => {
            tracing::info!(
                trace_id = %&*trace_id,
                tool = %name,
                is_error = output.is_error,
                "Tool invoked"
            );
            success_response(StatusCode::OK, &trace_id, output)
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            &format!("unknown tool: {name}"),
        ),
    }
}

pub fn tool_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_tools))
        .routes(routes!(invoke_tool))
}
