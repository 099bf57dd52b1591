//! Phone SSO - phone-number accounts with per-app session tokens
//!
//! # Modules
//!
//! - [`user_auth`] - Registration, login, Argon2id hashing, HS256 tokens, bearer middleware
//! - [`storage`] - Credential store, tenant registry and content store (PostgreSQL + in-process)
//! - [`content`] - Profile, feed with favorites, quizzes
//! - [`gateway`] - axum router, JSON envelope, OpenAPI docs
//! - [`db`] - PostgreSQL pool and migrations
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod content;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod storage;
pub mod user_auth;

// Convenient re-exports at crate root
pub use config::{AppConfig, AuthConfig};
pub use gateway::{build_router, state::AppState};
pub use storage::{ContentStore, CredentialStore, MemoryStore, PgStore, StoreError, TenantRegistry};
pub use user_auth::{AuthError, AuthService, AuthenticatedUser, IssuedToken};
