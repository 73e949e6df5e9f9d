// JSON REST routes over the entity gateway and the tool registry.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use breezly_api::EntityKind;

use crate::AppState;
use crate::tools::{ToolError, find_by_internal_id, tool_definitions};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/properties", get(list_properties))
        .route("/api/properties/search", get(search_properties))
        .route("/api/properties/internal/{id}", get(property_by_internal_id))
        .route("/api/properties/{id}", get(get_property))
        .route("/api/tasks", get(list_tasks))
        .route("/api/reservations", get(list_reservations))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(call_tool))
}

// ── Errors ──────────────────────────────────────────────────────────

/// `{ "error": <message> }` with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<breezly_api::Error> for ApiError {
    fn from(err: breezly_api::Error) -> Self {
        let status = upstream_status(&err);
        if status == StatusCode::BAD_GATEWAY {
            warn!(error = %err, "upstream failure");
        }
        Self::new(status, err.to_string())
    }
}

fn upstream_status(err: &breezly_api::Error) -> StatusCode {
    match err {
        breezly_api::Error::UnsupportedKind(_) => StatusCode::BAD_REQUEST,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "breezly" }))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn list_properties(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let all = state.toolbox.client().list_properties(&[]).await?;
    let total = all.len();
    let results: Vec<_> = all
        .into_iter()
        .skip(page.offset.unwrap_or(0))
        .take(page.limit.unwrap_or(usize::MAX))
        .collect();

    Ok(Json(json!({
        "total": total,
        "count": results.len(),
        "results": results,
    })))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn search_properties(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let q = query
        .q
        .map(|q| q.trim().to_owned())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "missing query parameter 'q'"))?;

    let results = state
        .toolbox
        .client()
        .search(&q, Some(&[EntityKind::Property]))
        .await;

    Ok(Json(json!({
        "query": q,
        "count": results.len(),
        "results": results,
    })))
}

async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state
        .toolbox
        .client()
        .get(EntityKind::Property, &id)
        .await?;
    Ok(Json(Value::Object(record.into_fields())))
}

async fn property_by_internal_id(
    State(state): State<AppState>,
    Path(internal_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = find_by_internal_id(state.toolbox.client(), &internal_id)
        .await?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                format!("No property found with Internal ID: {internal_id}"),
            )
        })?;
    Ok(Json(Value::Object(record.into_fields())))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    list_kind(&state, EntityKind::Task, &params).await
}

async fn list_reservations(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    list_kind(&state, EntityKind::Reservation, &params).await
}

async fn list_kind(
    state: &AppState,
    kind: EntityKind,
    params: &BTreeMap<String, String>,
) -> Result<Json<Value>, ApiError> {
    let pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let results = state.toolbox.client().list(kind, &pairs).await?;

    Ok(Json(json!({
        "count": results.len(),
        "results": results,
    })))
}

async fn list_tools() -> Json<Value> {
    let tools: Vec<Value> = tool_definitions()
        .into_iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "input_schema": Value::Object((*t.input_schema).clone()),
            })
        })
        .collect();
    Json(json!({ "tools": tools }))
}

/// `POST /api/tools/{name}` with the tool arguments as the JSON body.
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let args = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            ApiError::new(StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}"))
        })?
    };

    match state.toolbox.call(&name, args).await {
        Ok(text) => Ok(Json(json!({ "tool": name, "text": text }))),
        Err(ToolError::UnknownTool(tool)) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Unknown tool: {tool}"),
        )),
        Err(e @ ToolError::InvalidArguments { .. }) => {
            Err(ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(ToolError::Failed(e)) => {
            let status = upstream_status(&e);
            let message = ToolError::Failed(e).tool_message(&name);
            Err(ApiError::new(status, message))
        }
    }
}
