// Route table for the dashboard service
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    active_tenant, active_theme, add_widget, agent_performance, alerts, call_sentiment, calls, date_range,
    drag_event, drag_state, health_check, key_phrases, list_kpis, list_tables, list_tenants, list_themes,
    list_widgets, mobile_banking_metrics, notifications, remove_widget, render_dashboard, reset_dashboard,
    save_layout, select_tenant, select_theme, set_time_range, stream_dashboard, table_structure,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Compression is handled in the JSON response builder, so no CompressionLayer here
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/kpis", get(list_kpis))
        .route("/api/tenants", get(list_tenants))
        .route("/api/tenants/active", get(active_tenant).put(select_tenant))
        .route("/api/themes", get(list_themes))
        .route("/api/themes/active", get(active_theme).put(select_theme))
        .route("/api/dashboard/widgets", get(list_widgets).post(add_widget))
        .route("/api/dashboard/widgets/:id", delete(remove_widget))
        .route("/api/dashboard/reset", post(reset_dashboard))
        .route("/api/dashboard/save", post(save_layout))
        .route("/api/dashboard/time-range", put(set_time_range))
        .route("/api/dashboard/date-range", get(date_range))
        .route("/api/dashboard/drag", get(drag_state).post(drag_event))
        .route("/api/dashboard/notifications", get(notifications))
        .route("/api/dashboard/render", get(render_dashboard))
        .route("/api/dashboard/stream", get(stream_dashboard))
        .route("/api/agents/performance", get(agent_performance))
        .route("/api/alerts", get(alerts))
        .route("/api/calls", get(calls))
        .route("/api/calls/sentiment", get(call_sentiment))
        .route("/api/key-phrases", get(key_phrases))
        .route("/api/mobile-banking/metrics", get(mobile_banking_metrics))
        .route("/api/database/tables", get(list_tables))
        .route("/api/database/table-structure/:table", get(table_structure))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analytics_repository::AnalyticsRepository;
    use crate::application::analytics_service::AnalyticsService;
    use crate::application::render_service::RenderService;
    use crate::application::session::{SessionPolicy, SessionRegistry};
    use crate::application::test_support::StubRepository;
    use crate::application::widget_data_service::WidgetDataService;
    use crate::domain::dashboard::default_layout;
    use crate::domain::kpi::KpiCatalog;
    use crate::domain::tenant::{Tenant, TenantContext, User};
    use crate::infrastructure::preferences::FilePreferenceStore;
    use crate::infrastructure::sample_repository::SampleRepository;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::TimeDelta;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with(repository: Arc<dyn AnalyticsRepository>, name: &str) -> Router {
        let catalog = Arc::new(KpiCatalog::builtin().unwrap());
        let prefs = std::env::temp_dir()
            .join(format!("callcenter-dashboard-router-{}-{}", std::process::id(), name))
            .join("preferences.json");
        let _ = std::fs::remove_file(&prefs);

        let tenants = TenantContext::new(
            vec![Tenant::new(1, "First National", "FNB"), Tenant::new(2, "Coastal Credit", "CCU")],
            Some(User {
                id: "u-1".to_string(),
                name: "Dana Reyes".to_string(),
                role: "supervisor".to_string(),
            }),
        )
        .unwrap();
        let data = WidgetDataService::new(repository.clone(), catalog.clone(), Duration::from_secs(5));
        let policy = SessionPolicy {
            notification_ttl: TimeDelta::seconds(3),
            idle_ttl: TimeDelta::minutes(30),
            max_sessions: 100,
        };
        let preferences = Arc::new(FilePreferenceStore::new(prefs));
        let state = AppState {
            catalog,
            sessions: SessionRegistry::new(tenants, default_layout(), preferences, policy),
            analytics_service: AnalyticsService::new(repository),
            render_service: RenderService::new(data),
        };
        router(Arc::new(state))
    }

    fn app(name: &str) -> Router {
        app_with(Arc::new(SampleRepository::new()), name)
    }

    fn get_req(uri: &str, session: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-session-id", session)
            .body(Body::empty())
            .unwrap()
    }

    fn json_req(method: &str, uri: &str, session: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-session-id", session)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app("health").oneshot(get_req("/healthz", "s")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_kpis_filter_by_domain() {
        let app = app("kpis");
        let (status, all) = send(&app, get_req("/api/kpis", "s")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, mobile) = send(&app, get_req("/api/kpis?domain=mobile-banking", "s")).await;
        let groups = mobile.as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["domain"], "mobile-banking");

        let (_, critical) = send(&app, get_req("/api/kpis?domain=contact-center&priority=critical", "s")).await;
        let kpis = critical[0]["kpis"].as_array().unwrap();
        assert!(!kpis.is_empty());
        assert!(kpis.iter().all(|k| k["priority"] == "critical"));

        let (status, _) = send(&app, get_req("/api/kpis?domain=retail", "s")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_widget_edits_are_per_session() {
        let app = app("sessions");
        let widget = json!({
            "id": "w-extra",
            "title": "Extra",
            "type": "value",
            "size": "small",
            "kpiId": "service-level"
        });

        let (status, _) = send(&app, json_req("POST", "/api/dashboard/widgets", "a", widget.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, json_req("POST", "/api/dashboard/widgets", "a", widget)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Conflict");

        let (_, a) = send(&app, get_req("/api/dashboard/widgets", "a")).await;
        let (_, b) = send(&app, get_req("/api/dashboard/widgets", "b")).await;
        assert_eq!(a.as_array().unwrap().len(), default_layout().len() + 1);
        assert_eq!(b.as_array().unwrap().len(), default_layout().len());
    }

    #[tokio::test]
    async fn test_chart_widget_without_chart_type_is_bad_request() {
        let app = app("invalid-widget");
        let widget = json!({"id": "w", "title": "W", "type": "chart", "size": "small", "kpiId": "call-volume"});
        let (status, _) = send(&app, json_req("POST", "/api/dashboard/widgets", "s", widget)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove_then_reset_restores_defaults() {
        let app = app("reset");
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/dashboard/widgets/default-sentiment")
                    .header("x-session-id", "s")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (_, saved) = send(&app, json_req("POST", "/api/dashboard/save", "s", json!({}))).await;
        assert_eq!(saved["persisted"], false);
        assert_eq!(saved["widgets"].as_array().unwrap().len(), default_layout().len() - 1);

        let (_, reset) = send(&app, json_req("POST", "/api/dashboard/reset", "s", json!({}))).await;
        assert_eq!(reset.as_array().unwrap().len(), default_layout().len());
    }

    #[tokio::test]
    async fn test_drop_adds_widget_and_notification() {
        let app = app("drag");
        for event in [
            json!({"event": "dragStart", "kpiId": "login-success"}),
            json!({"event": "enterDropZone"}),
        ] {
            let (status, _) = send(&app, json_req("POST", "/api/dashboard/drag", "s", event)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, dropped) = send(&app, json_req("POST", "/api/dashboard/drag", "s", json!({"event": "drop"}))).await;
        assert_eq!(dropped["outcome"], "added");
        assert_eq!(dropped["state"]["state"], "idle");
        assert_eq!(dropped["dropped"]["state"], "dropped");
        assert_eq!(dropped["dropped"]["kpiId"], "login-success");
        assert_eq!(dropped["widget"]["type"], "chart");
        assert_eq!(dropped["widget"]["chartType"], "pie");

        let (_, notes) = send(&app, get_req("/api/dashboard/notifications", "s")).await;
        assert_eq!(notes[0]["message"], "Added Login Success to dashboard");
    }

    #[tokio::test]
    async fn test_tenant_and_theme_selection() {
        let app = app("select");
        let (status, tenant) =
            send(&app, json_req("PUT", "/api/tenants/active", "s", json!({"tenantId": 2}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tenant["code"], "CCU");
        let (_, active) = send(&app, get_req("/api/tenants/active", "s")).await;
        assert_eq!(active["tenant"]["id"], 2);
        assert_eq!(active["user"]["role"], "supervisor");

        let (status, _) = send(&app, json_req("PUT", "/api/tenants/active", "s", json!({"tenantId": 99}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, theme) = send(&app, json_req("PUT", "/api/themes/active", "s", json!({"key": "dark"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(theme["key"], "dark");

        let (status, _) = send(&app, json_req("PUT", "/api/themes/active", "s", json!({"key": "neon"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, active) = send(&app, get_req("/api/themes/active", "s")).await;
        assert_eq!(active["key"], "dark");
    }

    #[tokio::test]
    async fn test_theme_selection_is_per_session() {
        let app = app("theme-sessions");
        let (status, _) = send(&app, json_req("PUT", "/api/themes/active", "a", json!({"key": "dark"}))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, active) = send(&app, get_req("/api/themes/active", "b")).await;
        assert_eq!(active["key"], "light");
        let (_, dashboard) = send(&app, get_req("/api/dashboard/render", "b")).await;
        assert_eq!(dashboard["theme"], "light");

        let (_, dashboard) = send(&app, get_req("/api/dashboard/render", "a")).await;
        assert_eq!(dashboard["theme"], "dark");
    }

    #[tokio::test]
    async fn test_time_range_drives_date_range() {
        let app = app("range");
        let (status, view) = send(&app, json_req("PUT", "/api/dashboard/time-range", "s", json!({"range": "week"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["timeRange"]["range"], "week");
        assert!(view["startDate"].is_string());

        let (_, other) = send(&app, get_req("/api/dashboard/date-range", "other")).await;
        assert_eq!(other["timeRange"]["range"], "today");
    }

    #[tokio::test]
    async fn test_data_endpoint_requires_tenant_id() {
        let app = app("data");
        let (status, _) = send(&app, get_req("/api/alerts", "s")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, alerts) = send(&app, get_req("/api/alerts?tenantId=1", "s")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!alerts.as_array().unwrap().is_empty());

        let (status, _) = send(&app, get_req("/api/database/table-structure/no_such_table?tenantId=1", "s")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_shows_fixed_message_for_failed_sentiment() {
        let repository = StubRepository {
            sentiment_failures: HashMap::from([(1, 500)]),
            ..Default::default()
        };
        let app = app_with(Arc::new(repository), "render");

        let (status, dashboard) = send(&app, get_req("/api/dashboard/render", "s")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["theme"], "light");

        let sentiment = dashboard["widgets"]
            .as_array()
            .unwrap()
            .iter()
            .find(|w| w["widget"]["id"] == "default-sentiment")
            .unwrap();
        assert_eq!(sentiment["view"]["view"], "error");
        assert_eq!(sentiment["view"]["message"], "Failed to load sentiment data");
    }

    #[tokio::test]
    async fn test_stream_frames_are_ndjson() {
        let response = app("stream").oneshot(get_req("/api/dashboard/stream", "s")).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/x-ndjson");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let frames: Vec<Value> = std::str::from_utf8(&bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(frames.first().unwrap()["type"], "skeleton");
        assert_eq!(frames.last().unwrap()["type"], "complete");
        assert_eq!(frames.len(), default_layout().len() + 2);
    }

    #[tokio::test]
    async fn test_brotli_when_accepted() {
        let request = Request::builder()
            .uri("/api/tenants")
            .header(header::ACCEPT_ENCODING, "gzip, br")
            .body(Body::empty())
            .unwrap();
        let response = app("brotli").oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");
    }
}
