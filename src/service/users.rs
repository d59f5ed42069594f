//! Protected data fetch
//!
//! Lists users from the Remote Auth API on behalf of the session holder.

use std::sync::Arc;

use crate::auth::SessionToken;
use crate::error::AppError;
use crate::upstream::{AuthApi, UserRecord};

/// User directory service
pub struct UserDirectory {
    api: Arc<dyn AuthApi>,
}

impl UserDirectory {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self { api }
    }

    /// Fetch the user list with `token` as bearer credential
    ///
    /// Records are passed through unmodified. Every upstream failure,
    /// including rejection of the token itself, becomes
    /// `UpstreamUnavailable`.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_users(&self, token: &SessionToken) -> Result<Vec<UserRecord>, AppError> {
        let users = self.api.list_users(token.as_str()).await.map_err(|error| {
            tracing::error!(%error, "Failed to fetch user data");
            AppError::UpstreamUnavailable
        })?;

        tracing::debug!(count = users.len(), "Fetched users");
        Ok(users)
    }
}
