//! Health check handler

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use axum::{Json, extract::State, http::StatusCode};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiResponse, error_codes};

/// Minimum gap between real database pings
const CHECK_INTERVAL_MS: i64 = 5000;

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1767225600000_i64)]
    pub timestamp_ms: i64,
    /// Build version
    #[schema(example = "0.1.0+3f2a9c1")]
    pub version: String,
}

/// Health check endpoint
///
/// Pings PostgreSQL at most once per interval when a database is configured.
/// The in-process store is always healthy. No dependency details are exposed.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    static LAST_CHECK_MS: AtomicI64 = AtomicI64::new(0);
    static LAST_OK: AtomicBool = AtomicBool::new(true);

    let now_ms = chrono::Utc::now().timestamp_millis();

    let healthy = match state.db {
        Some(ref db) if now_ms - LAST_CHECK_MS.load(Ordering::Relaxed) > CHECK_INTERVAL_MS => {
            LAST_CHECK_MS.store(now_ms, Ordering::Relaxed);
            let ok = match db.health_check().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                    false
                }
            };
            LAST_OK.store(ok, Ordering::Relaxed);
            ok
        }
        Some(_) => LAST_OK.load(Ordering::Relaxed),
        None => true,
    };

    if healthy {
        (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                timestamp_ms: now_ms,
                version: env!("BUILD_VERSION").to_string(),
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                code: error_codes::SERVICE_UNAVAILABLE,
                msg: "unavailable".to_string(),
                data: None,
            }),
        )
    }
}
