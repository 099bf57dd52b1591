use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::db::Database;
use crate::storage::{ContentStore, StoreError};
use crate::user_auth::AuthService;

use super::types::ApiError;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Register / login / token validation
    pub auth: Arc<AuthService>,
    /// Profile, feed, favorites and quizzes
    pub content: Arc<dyn ContentStore>,
    /// PostgreSQL, when running against a real database
    pub db: Option<Arc<Database>>,
    /// Deadline for a single content store call
    op_timeout: Duration,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        content: Arc<dyn ContentStore>,
        db: Option<Arc<Database>>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            auth,
            content,
            db,
            op_timeout,
        }
    }

    /// Run a content store call under the deadline.
    ///
    /// `what` names the resource in the `NotFound` message.
    pub async fn bounded<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, ApiError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(res) => res.map_err(|e| ApiError::from_store(e, what)),
            Err(_) => Err(ApiError::canceled()),
        }
    }
}
