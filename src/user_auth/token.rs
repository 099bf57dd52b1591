//! Session tokens (HS256 JWT).
//!
//! The issuing app id is carried twice: in the `kid` header, so a verifier
//! can pick the right secret before checking the MAC, and in the signed
//! `app_id` claim, which must agree with the header.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use super::error::AuthError;

/// Claims embedded in every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id
    pub sub: i64,
    /// Identity key the subject logged in with
    pub phone: String,
    /// Issuing app
    pub app_id: i32,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// Signed token returned by login
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedToken {
    pub token: String,
    /// Expiry (Unix seconds)
    #[schema(example = 1767225600_i64)]
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        user_id: i64,
        phone: &str,
        app_id: i32,
        secret: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, phone, app_id, secret, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: i64,
        phone: &str,
        app_id: i32,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| AuthError::Internal(format!("token ttl out of range: {}", e)))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal("token expiry overflow".to_string()))?
            .timestamp();

        let claims = Claims {
            sub: user_id,
            phone: phone.to_string(),
            app_id,
            iat: now.timestamp(),
            exp: expires_at,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let header = Header {
            kid: Some(app_id.to_string()),
            ..Header::new(Algorithm::HS256)
        };

        let token = encode(&header, &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify the MAC with `secret`, then require `exp > now`.
    ///
    /// Every failure is `TokenInvalid`.
    pub fn validate(&self, token: &str, secret: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            AuthError::TokenInvalid
        })?;

        let claims = data.claims;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenInvalid);
        }
        if data.header.kid.as_deref() != Some(claims.app_id.to_string().as_str()) {
            return Err(AuthError::TokenInvalid);
        }
        Ok(claims)
    }
}

/// Read the app id from the unverified `kid` header.
///
/// Only used to select a secret; `TokenIssuer::validate` re-checks it
/// against the signed claim.
pub fn peek_app_id(token: &str) -> Result<i32, AuthError> {
    let header = jsonwebtoken::decode_header(token).map_err(|_| AuthError::TokenInvalid)?;
    header
        .kid
        .and_then(|kid| kid.parse::<i32>().ok())
        .filter(|id| *id > 0)
        .ok_or(AuthError::TokenInvalid)
}
