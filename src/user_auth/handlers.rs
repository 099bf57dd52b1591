use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::error::AuthError;
use super::token::IssuedToken;
use crate::gateway::{
    state::AppState,
    types::{ApiResponse, ValidJson},
};

/// Registration request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "+15550100")]
    #[serde(default)]
    pub phone: String,
    #[schema(example = "password123")]
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i64,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "+15550100")]
    #[serde(default)]
    pub phone: String,
    #[schema(example = "password123")]
    #[serde(default)]
    pub password: String,
    /// Issuing app; 0, null or absent is rejected
    #[schema(example = 1)]
    #[serde(default)]
    pub app_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IsAdminRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Malformed body, missing identity or password"),
        (status = 409, description = "User already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), AuthError> {
    let user_id = state.auth.register(&req.phone, &req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisterResponse { user_id })),
    ))
}

/// Login and receive a session token for one app
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<IssuedToken>),
        (status = 400, description = "Malformed body, missing identity, password or app_id"),
        (status = 401, description = "Invalid identity or password"),
        (status = 404, description = "App not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<IssuedToken>>, AuthError> {
    let issued = state
        .auth
        .login(&req.phone, &req.password, req.app_id.unwrap_or(0))
        .await?;
    Ok(Json(ApiResponse::success(issued)))
}

/// Check the privilege flag of a user
///
/// POST /api/v1/auth/is_admin
#[utoipa::path(
    post,
    path = "/api/v1/auth/is_admin",
    request_body = IsAdminRequest,
    responses(
        (status = 200, description = "Privilege flag", body = ApiResponse<IsAdminResponse>),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn is_admin(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<IsAdminRequest>,
) -> Result<Json<ApiResponse<IsAdminResponse>>, AuthError> {
    let is_admin = state.auth.is_admin(req.user_id).await?;
    Ok(Json(ApiResponse::success(IsAdminResponse { is_admin })))
}
