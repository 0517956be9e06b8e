//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::state::AppState;
use crate::alerts::AlertDetails;
use crate::error::NetguardError;
use crate::security::{ScanRequest, Signature};
use crate::traffic::DEFAULT_PAGE_SIZE;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .route("/", get(root))
        // Health and status
        .route("/health", get(health_check))
        .route("/status", get(status))
        // Threat detection
        .route("/scan", post(scan_payload))
        .route("/api/threats/scan", post(scan_payload))
        .route("/api/threats/signatures", get(list_signatures))
        // Alert log
        .route("/api/alerts", get(list_alerts).post(create_alert))
        .route("/api/alerts/:id/resolve", put(resolve_alert))
        // Traffic sample
        .route("/api/traffic", get(list_traffic))
        .route("/api/traffic/stats", get(traffic_stats))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_size));

    if config.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }
    if config.logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Map an error to a status code and `{"error": ...}` body
fn error_response(err: &NetguardError) -> Response {
    let status = if !err.is_caller_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else if matches!(err, NetguardError::AlertNotFound(_)) {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {err}");
    } else {
        tracing::debug!("Request rejected: {err}");
    }

    let message = match err {
        NetguardError::InvalidInput(msg) => msg.clone(),
        NetguardError::AlertNotFound(_) => "Alert not found".to_string(),
        _ => "Internal server error".to_string(),
    };

    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Bad JSON is a 400; transport-level rejections keep their own status
fn invalid_body(rejection: &JsonRejection) -> Response {
    match rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            error_response(&NetguardError::InvalidInput(rejection.body_text()))
        }
        _ => {
            tracing::debug!("Request body rejected: {}", rejection.body_text());
            (
                rejection.status(),
                Json(serde_json::json!({ "error": rejection.body_text() })),
            )
                .into_response()
        }
    }
}

/// Banner
async fn root() -> &'static str {
    "Netguard IDS server running"
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `ok`
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Status response
#[derive(Serialize)]
pub struct StatusResponse {
    /// Always `ok`
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Seconds since startup
    pub uptime_secs: u64,
    /// Signatures loaded
    pub signatures: usize,
    /// Alerts recorded
    pub alerts: usize,
    /// Traffic rows loaded
    pub traffic_records: usize,
}

/// Status endpoint
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime().as_secs(),
        signatures: state.scanner.registry().len(),
        alerts: state.alerts.count().await,
        traffic_records: state.traffic.len(),
    })
}

/// Scan a payload for known attack signatures
async fn scan_payload(
    State(state): State<Arc<AppState>>,
    req: Result<Json<ScanRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match req {
        Ok(req) => req,
        Err(rejection) => return invalid_body(&rejection),
    };

    let result = state.scanner.scan_request(&req);

    if result.is_threat() {
        tracing::info!(
            threats = result.threats().len(),
            categories = ?result.categories(),
            "Threat detected in payload"
        );
        if state.config.record_alerts {
            state.alerts.create(AlertDetails::from_scan(&result)).await;
        }
    }

    (StatusCode::OK, Json(result)).into_response()
}

/// List the signature registry
async fn list_signatures(State(state): State<Arc<AppState>>) -> Json<Vec<Signature>> {
    Json(state.scanner.registry().iter().cloned().collect())
}

/// List alerts, newest first
async fn list_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.alerts.list().await)
}

/// Record an alert
async fn create_alert(
    State(state): State<Arc<AppState>>,
    req: Result<Json<AlertDetails>, JsonRejection>,
) -> Response {
    match req {
        Ok(Json(details)) => Json(state.alerts.create(details).await).into_response(),
        Err(rejection) => invalid_body(&rejection),
    }
}

/// Mark an alert resolved
async fn resolve_alert(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.alerts.resolve(&id).await {
        Ok(alert) => Json(alert).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Traffic page query
///
/// Values are kept as text; anything that is not a positive integer falls
/// back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct TrafficQuery {
    /// 1-based page number
    pub page: Option<String>,
    /// Page size
    pub limit: Option<String>,
}

impl TrafficQuery {
    fn parse(value: Option<&str>, default: usize) -> usize {
        value
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(default)
    }

    /// Page number
    pub fn page(&self) -> usize {
        Self::parse(self.page.as_deref(), 1)
    }

    /// Page size
    pub fn limit(&self) -> usize {
        Self::parse(self.limit.as_deref(), DEFAULT_PAGE_SIZE)
    }
}

/// One page of the traffic sample
async fn list_traffic(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrafficQuery>,
) -> impl IntoResponse {
    Json(state.traffic.page(query.page(), query.limit()))
}

/// Traffic summary counters
async fn traffic_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.traffic.stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traffic_query_defaults() {
        let query = TrafficQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);

        let query = TrafficQuery {
            page: Some("abc".to_string()),
            limit: Some("-5".to_string()),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);

        let query = TrafficQuery {
            page: Some("3".to_string()),
            limit: Some(" 25 ".to_string()),
        };
        assert_eq!(query.page(), 3);
        assert_eq!(query.limit(), 25);
    }

    #[test]
    fn test_error_status_codes() {
        let resp = error_response(&NetguardError::InvalidInput("missing payload".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = error_response(&NetguardError::AlertNotFound("x".into()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = error_response(&NetguardError::Internal("boom".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = error_response(&NetguardError::Registry("empty pattern".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
