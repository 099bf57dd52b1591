//! Phone-number credentials and session tokens
//!
//! - [`service::AuthService`]: register, login, admin check, token validation
//! - [`password`]: Argon2id hashing
//! - [`token`]: HS256 tokens signed with a per-app secret
//! - [`middleware`]: bearer-token guard for protected routes

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use error::{AuthError, AuthErrorCode};
pub use middleware::{bearer_token, jwt_auth_middleware};
pub use password::PasswordHasher;
pub use service::{AuthService, AuthenticatedUser};
pub use token::{Claims, IssuedToken, TokenIssuer};
