//! Storage collaborators
//!
//! Traits that abstract the relational store, enabling:
//! - Uniqueness enforcement at the storage layer (never check-then-act)
//! - Testability through the in-process [`MemoryStore`]
//! - PostgreSQL in production via [`PgStore`]

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::models::{Clip, FavoriteKind, Feed, Profile, Quiz};

/// Errors reported by any store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation on insert
    #[error("record already exists")]
    AlreadyExists,

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Stored credential, read at login
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: i64,
    pub phone: String,
    /// PHC-format Argon2 hash, never the plaintext
    pub password_hash: String,
}

// ============================================================================
// Credential Store
// ============================================================================

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new identity and return its subject id.
    ///
    /// Must be a single atomic insert; a duplicate phone yields
    /// `StoreError::AlreadyExists`.
    async fn save(&self, phone: &str, password_hash: &str) -> Result<i64, StoreError>;

    /// Look up a credential by phone.
    async fn find(&self, phone: &str) -> Result<Credential, StoreError>;

    /// Privilege flag for a subject; `NotFound` when the subject is absent.
    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError>;
}

// ============================================================================
// Tenant Registry
// ============================================================================

#[async_trait]
pub trait TenantRegistry: Send + Sync {
    /// Signing secret for an app; `NotFound` when the app is unknown.
    async fn secret_for(&self, app_id: i32) -> Result<String, StoreError>;
}

// ============================================================================
// Content Store
// ============================================================================

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn profile(&self, user_id: i64) -> Result<Profile, StoreError>;

    /// Remove the identity together with its credential and favorites.
    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError>;

    /// Full catalog with this user's favorite flags applied.
    async fn feed(&self, user_id: i64) -> Result<Feed, StoreError>;

    /// Idempotent; `NotFound` when the item does not exist.
    async fn set_favorite(
        &self,
        user_id: i64,
        kind: FavoriteKind,
        item_id: i64,
        is_fave: bool,
    ) -> Result<(), StoreError>;

    async fn quiz(&self, quiz_id: i64) -> Result<Quiz, StoreError>;

    /// Clip segments in position order, with the clip's quiz.
    async fn clip(&self, clip_id: i64) -> Result<Clip, StoreError>;
}
