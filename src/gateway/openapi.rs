//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::content::handlers::{DeletedResponse, FavoriteResponse, SetFavoriteRequest};
use crate::content::models::{
    Answer, Article, Author, Clip, ClipText, FavoriteKind, Feed, Poet, Profile, Quiz,
};
use crate::gateway::handlers::HealthResponse;
use crate::user_auth::handlers::{
    IsAdminRequest, IsAdminResponse, LoginRequest, RegisterRequest, RegisterResponse,
};
use crate::user_auth::IssuedToken;

/// Session token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Session token from /api/v1/auth/login, signed with the issuing app's secret",
                ))
                .build();
            components.add_security_scheme("bearer_auth", SecurityScheme::Http(scheme));
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Phone SSO API",
        version = "1.0.0",
        description = "Phone-number registration, multi-app session tokens and per-user content.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::is_admin,
        crate::content::handlers::get_profile,
        crate::content::handlers::delete_user,
        crate::content::handlers::get_feed,
        crate::content::handlers::set_favorite,
        crate::content::handlers::get_quiz,
        crate::content::handlers::get_clip,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            IssuedToken,
            IsAdminRequest,
            IsAdminResponse,
            Profile,
            Feed,
            Author,
            Article,
            Poet,
            Quiz,
            Answer,
            Clip,
            ClipText,
            FavoriteKind,
            SetFavoriteRequest,
            FavoriteResponse,
            DeletedResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and privilege checks"),
        (name = "Content", description = "Per-user content (bearer token required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
