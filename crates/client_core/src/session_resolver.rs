use std::sync::Arc;

use shared::domain::Account;
use tracing::{debug, info};

use crate::{error::PageError, lifecycle::PageScope, transport::AuthApi};

/// What a page knows about the visitor's session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Resolution has not finished; show the loading indicator only.
    #[default]
    Pending,
    Authenticated(Account),
    Unauthenticated,
}

impl SessionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Authenticated(account) => Some(account),
            _ => None,
        }
    }
}

/// Decides on mount whether a session exists: ask for the account, and if
/// that fails, refresh once and ask again.
#[derive(Clone)]
pub struct SessionResolver {
    api: Arc<dyn AuthApi>,
}

impl SessionResolver {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self { api }
    }

    /// Never returns [`SessionState::Pending`]. Fails only when the page is
    /// torn down mid-resolution.
    pub async fn resolve(&self, scope: &PageScope) -> Result<SessionState, PageError> {
        match scope.guard(self.api.me()).await? {
            Ok(account) => {
                info!(account_id = %account.id, "existing session is valid");
                return Ok(SessionState::Authenticated(account));
            }
            Err(err) => debug!("session check failed, attempting refresh: {err}"),
        }

        if let Err(err) = scope.guard(self.api.refresh()).await? {
            info!("session refresh failed, visitor is unauthenticated: {err}");
            return Ok(SessionState::Unauthenticated);
        }

        match scope.guard(self.api.me()).await? {
            Ok(account) => {
                info!(account_id = %account.id, "session restored by refresh");
                Ok(SessionState::Authenticated(account))
            }
            Err(err) => {
                info!("session check after refresh failed, visitor is unauthenticated: {err}");
                Ok(SessionState::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_resolver_tests.rs"]
mod tests;
