// HTTP request handlers
use crate::application::dashboard_store::SavedLayout;
use crate::application::drag_drop::{DragEvent, DragOutcome, DragState};
use crate::application::session::{DashboardSession, DEFAULT_SESSION};
use crate::domain::analytics::QueryParams;
use crate::domain::kpi::{KpiDomain, KpiGroup, Priority};
use crate::domain::tenant::{Tenant, User};
use crate::domain::time_range::{DateRangeParams, TimeRange};
use crate::domain::widget::Widget;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Deserialize)]
pub struct KpiQuery {
    pub domain: Option<KpiDomain>,
    pub priority: Option<Priority>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTenant {
    pub tenant_id: i64,
}

#[derive(Deserialize)]
pub struct SelectTheme {
    pub key: String,
}

#[derive(Serialize)]
struct ActiveTenant<'a> {
    tenant: &'a Tenant,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a User>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeView {
    time_range: TimeRange,
    #[serde(flatten)]
    params: DateRangeParams,
}

#[derive(Serialize)]
struct DragResponse {
    state: DragState,
    outcome: &'static str,
    /// Set on the response to a drop on the zone
    #[serde(skip_serializing_if = "Option::is_none")]
    dropped: Option<DragState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    widget: Option<Widget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Serialize a JSON response, Brotli-compressed when the client accepts it
async fn respond<T: Serialize>(headers: &HeaderMap, status: StatusCode, data: &T) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn session_for(state: &AppState, headers: &HeaderMap) -> Arc<Mutex<DashboardSession>> {
    let id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION);
    state.sessions.session(id).await
}

fn query_params(query: Result<Query<QueryParams>, QueryRejection>) -> Result<QueryParams, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// KPI catalog, optionally narrowed to one domain and/or priority tier
pub async fn list_kpis(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<KpiQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let groups: Vec<KpiGroup> = state
        .catalog
        .groups()
        .iter()
        .filter(|g| query.domain.is_none_or(|d| g.domain == d))
        .map(|g| match query.priority {
            Some(priority) => KpiGroup {
                domain: g.domain,
                kpis: state.catalog.by_priority(g.domain, priority).into_iter().cloned().collect(),
            },
            None => g.clone(),
        })
        .collect();
    Ok(respond(&headers, StatusCode::OK, &groups).await)
}

pub async fn list_tenants(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    respond(&headers, StatusCode::OK, &state.sessions.tenants()).await
}

pub async fn active_tenant(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let s = session.lock().await;
    let view = ActiveTenant {
        tenant: s.tenant.active(),
        user: s.tenant.user(),
    };
    respond(&headers, StatusCode::OK, &view).await
}

pub async fn select_tenant(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: Result<Json<SelectTenant>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(body)?;
    let session = session_for(&state, &headers).await;
    let tenant = session.lock().await.select_tenant(request.tenant_id)?;
    tracing::info!("Switched to tenant {} ({})", tenant.id, tenant.code);
    Ok(respond(&headers, StatusCode::OK, &tenant).await)
}

pub async fn list_themes(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let s = session.lock().await;
    respond(&headers, StatusCode::OK, &s.theme.themes()).await
}

pub async fn active_theme(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let s = session.lock().await;
    respond(&headers, StatusCode::OK, s.theme.active()).await
}

pub async fn select_theme(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: Result<Json<SelectTheme>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(body)?;
    let session = session_for(&state, &headers).await;
    let theme = session.lock().await.theme.set_active(&request.key).await?.clone();
    tracing::info!("Theme set to {}", theme.key);
    Ok(respond(&headers, StatusCode::OK, &theme).await)
}

pub async fn list_widgets(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let s = session.lock().await;
    respond(&headers, StatusCode::OK, &s.store.widgets()).await
}

pub async fn add_widget(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: Result<Json<Widget>, JsonRejection>,
) -> Result<Response, ApiError> {
    let widget = json_body(body)?;
    let session = session_for(&state, &headers).await;
    let added = session.lock().await.store.add_widget(widget)?.clone();
    Ok(respond(&headers, StatusCode::CREATED, &added).await)
}

/// Removing an id that is not on the dashboard is a no-op
pub async fn remove_widget(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    let session = session_for(&state, &headers).await;
    if session.lock().await.remove_widget(&id).is_none() {
        tracing::debug!("Widget {} not on dashboard; nothing removed", id);
    }
    StatusCode::NO_CONTENT
}

pub async fn reset_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let mut s = session.lock().await;
    s.reset_to_default();
    respond(&headers, StatusCode::OK, &s.store.widgets()).await
}

pub async fn save_layout(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let saved: SavedLayout = session.lock().await.store.save_layout();
    respond(&headers, StatusCode::OK, &saved).await
}

pub async fn set_time_range(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: Result<Json<TimeRange>, JsonRejection>,
) -> Result<Response, ApiError> {
    let range = json_body(body)?;
    let session = session_for(&state, &headers).await;
    let mut s = session.lock().await;
    s.store.set_time_range(range);
    let view = DateRangeView {
        time_range: range,
        params: s.store.date_range_params(Utc::now()),
    };
    Ok(respond(&headers, StatusCode::OK, &view).await)
}

pub async fn date_range(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let s = session.lock().await;
    let view = DateRangeView {
        time_range: s.store.time_range(),
        params: s.store.date_range_params(Utc::now()),
    };
    respond(&headers, StatusCode::OK, &view).await
}

pub async fn drag_event(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: Result<Json<DragEvent>, JsonRejection>,
) -> Result<Response, ApiError> {
    let event = json_body(body)?;
    let session = session_for(&state, &headers).await;
    let mut s = session.lock().await;
    let outcome = s.handle_drag(event, &state.catalog, Utc::now());

    let (outcome, dropped, widget, message) = match outcome {
        DragOutcome::Moved => ("moved", false, None, None),
        DragOutcome::Ignored => ("ignored", false, None, None),
        DragOutcome::Added { widget, kpi_name } => {
            ("added", true, Some(widget), Some(format!("Added {} to dashboard", kpi_name)))
        }
        DragOutcome::Discarded => ("discarded", true, None, None),
        DragOutcome::Rejected(e) => ("rejected", true, None, Some(e.to_string())),
    };
    let response = DragResponse {
        state: s.drag.state().clone(),
        outcome,
        dropped: dropped.then(|| s.drag.last_drop().cloned()).flatten(),
        widget,
        message,
    };
    Ok(respond(&headers, StatusCode::OK, &response).await)
}

pub async fn drag_state(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let s = session.lock().await;
    respond(&headers, StatusCode::OK, s.drag.state()).await
}

pub async fn notifications(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let active = session.lock().await.notifications.active(Utc::now());
    respond(&headers, StatusCode::OK, &active).await
}

/// Fetch every widget and return the fully rendered dashboard
pub async fn render_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let session = session_for(&state, &headers).await;
    let dashboard = state.render_service.render_dashboard(&session).await;
    respond(&headers, StatusCode::OK, &dashboard).await
}

/// Stream the dashboard: skeleton first, then each widget as its data lands
pub async fn stream_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = session_for(&state, &headers).await;
    let rx = state.render_service.stream_dashboard(session).await;
    stream_from_receiver(rx)
}

pub async fn agent_performance(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.agent_performance(&params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}

pub async fn alerts(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.alerts(&params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}

pub async fn calls(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.calls(&params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}

pub async fn call_sentiment(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.call_sentiment(&params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}

pub async fn key_phrases(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.key_phrases(&params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}

pub async fn mobile_banking_metrics(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.mobile_banking_metrics(&params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}

pub async fn list_tables(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.list_tables(&params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}

pub async fn table_structure(
    Path(table): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(query)?;
    let data = state.analytics_service.table_structure(&table, &params).await?;
    Ok(respond(&headers, StatusCode::OK, &data).await)
}
