pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::content::handlers as content;
use crate::user_auth::{handlers as auth, jwt_auth_middleware};
use state::AppState;

/// Assemble every route.
///
/// Content routes sit behind `jwt_auth_middleware`; auth and health are
/// public.
pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/is_admin", post(auth::is_admin));

    // route_layer: unmatched paths stay 404 instead of 401
    let protected_routes = Router::new()
        .route(
            "/api/v1/user",
            get(content::get_profile).delete(content::delete_user),
        )
        .route("/api/v1/feed", get(content::get_feed))
        .route("/api/v1/favorites", patch(content::set_favorite))
        .route("/api/v1/quiz/{quiz_id}", get(content::get_quiz))
        .route("/api/v1/clip/{clip_id}", get(content::get_clip))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/auth", auth_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process is stopped
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("Swagger UI at http://{}/docs", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))
}
