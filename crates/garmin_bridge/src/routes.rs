//! HTTP surface: the auth and activity routes plus health and metrics.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, debug_handler};
use chrono::{Duration, NaiveDateTime};
use garmin_connect_client::observability::Health;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::activities::ActivityService;
use crate::error::{ApiError, BridgeError, BridgeResult};
use crate::session::SessionManager;
use crate::types::{ActivitySummary, AuthRequest, AuthResponse};

pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub activities: Arc<ActivityService>,
    pub metrics: PrometheusHandle,
}

#[debug_handler]
async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health::readiness(state.sessions.is_authenticated().await))
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    state
        .sessions
        .authenticate(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(AuthResponse::authenticated()))
}

#[debug_handler]
async fn recent_activities(
    State(state): State<Arc<AppState>>,
    Path(days): Path<i64>,
) -> Json<Vec<ActivitySummary>> {
    let now = state.activities.now();
    let Some(start) = days_before(now, days) else {
        warn!(days, "activity window out of range");
        return Json(Vec::new());
    };
    let session = state.sessions.current().await;
    Json(
        state
            .activities
            .get_activities_or_empty(session.as_deref(), start, Some(now))
            .await,
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"detail": "Not Found"})),
    )
}

/// `now - days`, or `None` when the result is not representable.
fn days_before(now: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    Duration::try_days(days).and_then(|d| now.checked_sub_signed(d))
}

/// Single-origin CORS policy with credentials; methods and request headers
/// are mirrored back since wildcards cannot be combined with credentials.
pub fn cors_layer(origin: &str) -> BridgeResult<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| BridgeError::Config(format!("invalid CORS origin {origin:?}: {e}")))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn router(state: Arc<AppState>, cors: CorsLayer, max_body_size: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/garmin/auth", post(authenticate))
        .route("/api/garmin/activities/{days}", get(recent_activities))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn days_before_subtracts_calendar_days() {
        assert_eq!(days_before(noon(2024, 6, 10), 7), Some(noon(2024, 6, 3)));
        assert_eq!(days_before(noon(2024, 3, 1), 1), Some(noon(2024, 2, 29)));
        assert_eq!(days_before(noon(2024, 6, 10), 0), Some(noon(2024, 6, 10)));
    }

    #[test]
    fn days_before_negative_moves_forward() {
        assert_eq!(days_before(noon(2024, 6, 10), -2), Some(noon(2024, 6, 12)));
    }

    #[test]
    fn days_before_overflow_is_none() {
        assert_eq!(days_before(noon(2024, 6, 10), i64::MAX), None);
    }

    #[test]
    fn cors_layer_rejects_invalid_origin() {
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(cors_layer("bad\norigin").is_err());
    }
}
