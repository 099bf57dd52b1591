use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::AuthError;
use crate::gateway::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from `Authorization: Bearer <token>`.
///
/// A missing header is `MissingToken`; anything present but unusable is
/// `TokenInvalid`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::TokenInvalid)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::TokenInvalid)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::TokenInvalid);
    }
    Ok(token)
}

/// Validates the bearer token and injects `AuthenticatedUser` for downstream
/// handlers (`Extension<AuthenticatedUser>`).
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    // owned: the request body is not Sync, so no borrow may cross the await
    let token = bearer_token(request.headers())?.to_string();

    let user = state.auth.validate_token(&token).await.inspect_err(|e| {
        tracing::debug!("token rejected: {}", e);
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn test_bearer_token_extracted() {
        let h = headers("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&h).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_wrong_scheme_or_empty_token() {
        for value in ["Basic dXNlcjpwdw==", "abc.def.ghi", "Bearer ", "Bearer    "] {
            assert!(matches!(
                bearer_token(&headers(value)),
                Err(AuthError::TokenInvalid)
            ));
        }
    }
}
