use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use utoipa::ToSchema;

use super::error::AuthError;
use super::password::PasswordHasher;
use super::token::{self, IssuedToken, TokenIssuer};
use crate::config::AuthConfig;
use crate::storage::{CredentialStore, StoreError, TenantRegistry};

/// Identity established by a verified session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub phone: String,
    pub app_id: i32,
}

pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tenants: Arc<dyn TenantRegistry>,
    hasher: Arc<PasswordHasher>,
    issuer: TokenIssuer,
    op_timeout: Duration,
}

impl AuthService {
    pub fn new(
        config: &AuthConfig,
        credentials: Arc<dyn CredentialStore>,
        tenants: Arc<dyn TenantRegistry>,
    ) -> anyhow::Result<Self> {
        let hasher =
            PasswordHasher::new(&config.password).context("failed to build password hasher")?;

        Ok(Self {
            credentials,
            tenants,
            hasher: Arc::new(hasher),
            issuer: TokenIssuer::new(config.token_ttl()),
            op_timeout: config.op_timeout(),
        })
    }

    /// Register a new identity and return its subject id
    pub async fn register(&self, phone: &str, password: &str) -> Result<i64, AuthError> {
        validate_identity(phone, password)?;
        let phone = phone.trim();

        let hash = self.hash_password(password).await?;

        match self.bounded(self.credentials.save(phone, &hash)).await {
            Ok(user_id) => {
                tracing::info!(op = "register", phone, user_id, "user registered");
                Ok(user_id)
            }
            Err(AuthError::AlreadyExists) => {
                tracing::warn!(op = "register", phone, "registration for existing user");
                Err(AuthError::AlreadyExists)
            }
            Err(e) => {
                tracing::error!(op = "register", phone, error = %e, "registration failed");
                Err(e)
            }
        }
    }

    /// Verify credentials and issue a session token scoped to `app_id`
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
        app_id: i32,
    ) -> Result<IssuedToken, AuthError> {
        validate_identity(phone, password)?;
        let phone = phone.trim();
        if app_id == 0 {
            return Err(AuthError::Validation("app_id is required"));
        }

        let credential = match self.bounded(self.credentials.find(phone)).await {
            Ok(c) => Some(c),
            Err(AuthError::NotFound) => None,
            Err(e) => {
                tracing::error!(op = "login", phone, error = %e, "credential lookup failed");
                return Err(e);
            }
        };

        let Some(credential) = credential else {
            self.verify_dummy(password).await;
            tracing::warn!(op = "login", phone, "login failed");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(password, &credential.password_hash)
            .await?
        {
            tracing::warn!(op = "login", phone, "login failed");
            return Err(AuthError::InvalidCredentials);
        }

        let secret = self.secret_for(app_id).await.map_err(|e| match e {
            AuthError::TokenInvalid => AuthError::TenantNotFound,
            other => other,
        })?;

        let issued = self
            .issuer
            .issue(credential.user_id, &credential.phone, app_id, &secret)?;

        tracing::info!(
            op = "login",
            phone,
            user_id = credential.user_id,
            app_id,
            "token issued"
        );
        Ok(issued)
    }

    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        self.bounded(self.credentials.is_admin(user_id)).await
    }

    /// Check signature and expiry against the issuing app's current secret
    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let app_id = token::peek_app_id(token)?;
        let secret = self.secret_for(app_id).await?;
        let claims = self.issuer.validate(token, &secret)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            phone: claims.phone,
            app_id: claims.app_id,
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.issuer.ttl()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Unknown app maps to `TokenInvalid`; login remaps it to `TenantNotFound`
    async fn secret_for(&self, app_id: i32) -> Result<String, AuthError> {
        match self.bounded(self.tenants.secret_for(app_id)).await {
            Err(AuthError::NotFound) => Err(AuthError::TokenInvalid),
            other => other,
        }
    }

    /// Run a store call under the operation deadline
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(res) => res.map_err(AuthError::from),
            Err(_) => Err(AuthError::Canceled),
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task failed: {}", e)))
    }

    async fn verify_dummy(&self, password: &str) {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        if let Err(e) = tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await {
            tracing::warn!("dummy verify task failed: {}", e);
        }
    }
}

/// Identity first, then password. Callers store and look up the trimmed
/// identity; the password is used as given.
fn validate_identity(phone: &str, password: &str) -> Result<(), AuthError> {
    if phone.trim().is_empty() {
        return Err(AuthError::Validation("identity is required"));
    }
    if password.is_empty() {
        return Err(AuthError::Validation("password is required"));
    }
    Ok(())
}
