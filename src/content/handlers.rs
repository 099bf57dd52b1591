//! Content endpoints
//!
//! All routes sit behind `jwt_auth_middleware`; the caller is always the
//! token subject, never a request parameter.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::models::{Clip, FavoriteKind, Feed, Profile, Quiz};
use crate::gateway::{
    state::AppState,
    types::{ApiError, ApiResponse, ValidJson},
};
use crate::user_auth::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetFavoriteRequest {
    pub kind: FavoriteKind,
    pub item_id: i64,
    pub is_fave: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub user_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteResponse {
    pub kind: FavoriteKind,
    pub item_id: i64,
    pub is_fave: bool,
}

/// Profile of the caller
///
/// GET /api/v1/user
#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Profile", body = ApiResponse<Profile>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let profile = state
        .bounded("user", state.content.profile(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Delete the caller's account with its credential and favorites
///
/// DELETE /api/v1/user
#[utoipa::path(
    delete,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeletedResponse>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state
        .bounded("user", state.content.delete_user(user.user_id))
        .await?;
    tracing::info!(user_id = user.user_id, phone = %user.phone, "user deleted");
    Ok(Json(ApiResponse::success(DeletedResponse {
        user_id: user.user_id,
    })))
}

/// Catalog with the caller's favorite flags
///
/// GET /api/v1/feed
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    responses(
        (status = 200, description = "Feed", body = ApiResponse<Feed>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Feed>>, ApiError> {
    let feed = state
        .bounded("user", state.content.feed(user.user_id))
        .await?;
    Ok(Json(ApiResponse::success(feed)))
}

/// Mark or unmark an item as favorite
///
/// PATCH /api/v1/favorites
#[utoipa::path(
    patch,
    path = "/api/v1/favorites",
    request_body = SetFavoriteRequest,
    responses(
        (status = 200, description = "Favorite updated", body = ApiResponse<FavoriteResponse>),
        (status = 400, description = "Malformed body or non-positive item_id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn set_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidJson(req): ValidJson<SetFavoriteRequest>,
) -> Result<Json<ApiResponse<FavoriteResponse>>, ApiError> {
    if req.item_id <= 0 {
        return Err(ApiError::bad_request("item_id must be positive"));
    }

    state
        .bounded(
            "item",
            state
                .content
                .set_favorite(user.user_id, req.kind, req.item_id, req.is_fave),
        )
        .await?;

    Ok(Json(ApiResponse::success(FavoriteResponse {
        kind: req.kind,
        item_id: req.item_id,
        is_fave: req.is_fave,
    })))
}

/// Quiz with its answers
///
/// GET /api/v1/quiz/{quiz_id}
#[utoipa::path(
    get,
    path = "/api/v1/quiz/{quiz_id}",
    params(("quiz_id" = i64, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz", body = ApiResponse<Quiz>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<ApiResponse<Quiz>>, ApiError> {
    let quiz = state.bounded("quiz", state.content.quiz(quiz_id)).await?;
    Ok(Json(ApiResponse::success(quiz)))
}

/// Clip text segments in order, with the clip's quiz
///
/// GET /api/v1/clip/{clip_id}
#[utoipa::path(
    get,
    path = "/api/v1/clip/{clip_id}",
    params(("clip_id" = i64, Path, description = "Clip id")),
    responses(
        (status = 200, description = "Clip", body = ApiResponse<Clip>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Clip not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn get_clip(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Path(clip_id): Path<i64>,
) -> Result<Json<ApiResponse<Clip>>, ApiError> {
    let clip = state.bounded("clip", state.content.clip(clip_id)).await?;
    Ok(Json(ApiResponse::success(clip)))
}
