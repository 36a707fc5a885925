//! Liveness and readiness at `/health`, outside `/api/v1`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Annotation write settings in effect, for operators.
    pub annotation: AnnotationSettings,
}

#[derive(Serialize)]
pub struct AnnotationSettings {
    pub overlap_policy: &'static str,
    pub max_write_attempts: u32,
}

/// A degraded service answers 503 so load balancers stop routing to it.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = doclabel_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check: database unreachable");
    }

    let (code, status) = if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    let writer = state.config.annotation;

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            annotation: AnnotationSettings {
                overlap_policy: writer.overlap.as_str(),
                max_write_attempts: writer.retry.max_attempts(),
            },
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
