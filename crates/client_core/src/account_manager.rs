//! Profile page: shows the signed-in account and runs its mutating actions.

use std::{fmt, sync::Arc};

use shared::{domain::Account, protocol::UpdateAccountRequest};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::PageError,
    events::{PageEvent, PAGE_EVENT_CAPACITY},
    lifecycle::PageScope,
    navigation::{Confirmer, Navigator, Route},
    status::UiStatus,
    transport::AuthApi,
};

pub const DELETE_CONFIRMATION_PROMPT: &str =
    "Are you sure you want to delete your account? This action cannot be undone.";

/// The one mutating action a profile page may have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingAction {
    #[default]
    None,
    Updating,
    LoggingOut,
    Deleting,
}

impl PendingAction {
    pub fn is_idle(self) -> bool {
        self == Self::None
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Updating => "update",
            Self::LoggingOut => "logout",
            Self::Deleting => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Rejected by a local precondition; nothing was sent.
    Rejected,
    /// The user declined the confirmation; nothing was sent.
    Declined,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub account: Option<Account>,
    pub username_draft: String,
    pub pending: PendingAction,
    pub status: Option<UiStatus>,
}

impl ProfileView {
    pub fn is_busy(&self, action: PendingAction) -> bool {
        self.pending == action
    }

    /// Every action control is disabled while any action runs.
    pub fn controls_enabled(&self) -> bool {
        self.account.is_some() && self.pending.is_idle()
    }
}

#[derive(Default)]
struct ProfileState {
    account: Option<Account>,
    username_draft: String,
    pending: PendingAction,
    status: Option<UiStatus>,
}

/// Controller behind the profile page.
pub struct ProfilePage {
    api: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    confirmer: Arc<dyn Confirmer>,
    scope: PageScope,
    state: Mutex<ProfileState>,
    events: broadcast::Sender<PageEvent>,
}

impl ProfilePage {
    pub fn new(
        api: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        let (events, _) = broadcast::channel(PAGE_EVENT_CAPACITY);
        Self {
            api,
            navigator,
            confirmer,
            scope: PageScope::mount(),
            state: Mutex::new(ProfileState::default()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    pub async fn mount(&self) -> Result<ActionOutcome, PageError> {
        self.fetch_account().await
    }

    /// Loads the account. Without a session the visitor is sent to login;
    /// there is no refresh attempt here.
    pub async fn fetch_account(&self) -> Result<ActionOutcome, PageError> {
        self.scope.ensure_live()?;
        match self.scope.guard(self.api.me()).await? {
            Ok(account) => {
                info!(account_id = %account.id, "profile loaded");
                {
                    let mut state = self.state.lock().await;
                    state.username_draft = account.display_username().to_string();
                    state.account = Some(account.clone());
                }
                self.emit(PageEvent::AccountChanged(Some(account)));
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                warn!("profile fetch failed, redirecting to login: {err}");
                let status = UiStatus::error("You are not authorized.");
                {
                    let mut state = self.state.lock().await;
                    state.account = None;
                    state.username_draft.clear();
                    state.status = Some(status.clone());
                }
                self.emit(PageEvent::AccountChanged(None));
                self.emit(PageEvent::StatusChanged(Some(status)));
                self.navigator.navigate(Route::Login);
                Ok(ActionOutcome::Failed)
            }
        }
    }

    pub async fn set_username_draft(&self, draft: impl Into<String>) {
        self.state.lock().await.username_draft = draft.into();
    }

    /// Sends the trimmed `new_name` and replaces the account with whatever
    /// the server returns.
    pub async fn update_username(&self, new_name: &str) -> Result<ActionOutcome, PageError> {
        let username = new_name.trim().to_string();
        {
            let mut state = self.state.lock().await;
            self.check_ready(&state)?;
            state.username_draft = new_name.to_string();
            if username.is_empty() {
                let status = Some(UiStatus::error("Username cannot be empty."));
                state.status.clone_from(&status);
                drop(state);
                self.emit(PageEvent::StatusChanged(status));
                return Ok(ActionOutcome::Rejected);
            }
            self.claim(&mut state, PendingAction::Updating);
        }

        let request = UpdateAccountRequest { username };
        let result = self
            .settle(self.scope.guard(self.api.update_account(&request)).await)
            .await?;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(account) => {
                info!(account_id = %account.id, "account updated");
                state.username_draft = account.display_username().to_string();
                state.account = Some(account.clone());
                self.emit(PageEvent::AccountChanged(Some(account)));
                state.status = Some(UiStatus::success("Account updated successfully."));
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!("account update failed: {err}");
                let message = err
                    .server_message()
                    .unwrap_or_else(|| "Failed to update account.".to_string());
                state.status = Some(UiStatus::error(message));
                ActionOutcome::Failed
            }
        };
        self.release(&mut state);
        Ok(outcome)
    }

    /// On failure the account stays as it was, even though the server may
    /// already have ended the session.
    pub async fn logout(&self) -> Result<ActionOutcome, PageError> {
        {
            let mut state = self.state.lock().await;
            self.check_ready(&state)?;
            self.claim(&mut state, PendingAction::LoggingOut);
        }

        let result = self
            .settle(self.scope.guard(self.api.logout()).await)
            .await?;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(()) => {
                info!("logged out");
                state.account = None;
                self.emit(PageEvent::AccountChanged(None));
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!("logout failed, session state on the server is unknown: {err}");
                state.status = Some(UiStatus::error("Logout failed."));
                ActionOutcome::Failed
            }
        };
        self.release(&mut state);
        drop(state);

        if outcome == ActionOutcome::Completed {
            self.navigator.navigate(Route::Login);
        }
        Ok(outcome)
    }

    /// Asks for confirmation first; a declined prompt sends nothing.
    pub async fn delete_account(&self) -> Result<ActionOutcome, PageError> {
        self.check_ready(&*self.state.lock().await)?;

        let confirmed = self
            .scope
            .guard(self.confirmer.confirm(DELETE_CONFIRMATION_PROMPT))
            .await?;
        if !confirmed {
            info!("account deletion declined");
            return Ok(ActionOutcome::Declined);
        }

        {
            let mut state = self.state.lock().await;
            // Another action may have started while the prompt was open.
            self.check_ready(&state)?;
            self.claim(&mut state, PendingAction::Deleting);
        }

        let result = self
            .settle(self.scope.guard(self.api.delete_account()).await)
            .await?;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(()) => {
                info!("account deleted");
                state.account = None;
                self.emit(PageEvent::AccountChanged(None));
                state.status = Some(UiStatus::success("Account deleted successfully."));
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!("account deletion failed: {err}");
                state.status = Some(UiStatus::error("Failed to delete account."));
                ActionOutcome::Failed
            }
        };
        self.release(&mut state);
        drop(state);

        if outcome == ActionOutcome::Completed {
            self.navigator.navigate(Route::Landing);
        }
        Ok(outcome)
    }

    pub async fn dismiss_status(&self) {
        self.state.lock().await.status = None;
        self.emit(PageEvent::StatusChanged(None));
    }

    pub async fn snapshot(&self) -> ProfileView {
        let state = self.state.lock().await;
        ProfileView {
            account: state.account.clone(),
            username_draft: state.username_draft.clone(),
            pending: state.pending,
            status: state.status.clone(),
        }
    }

    pub fn unmount(&self) {
        self.scope.teardown();
    }

    fn claim(&self, state: &mut ProfileState, action: PendingAction) {
        state.pending = action;
        state.status = None;
        self.emit(PageEvent::PendingChanged(action));
        self.emit(PageEvent::StatusChanged(None));
    }

    fn release(&self, state: &mut ProfileState) {
        state.pending = PendingAction::None;
        self.emit(PageEvent::PendingChanged(PendingAction::None));
        self.emit(PageEvent::StatusChanged(state.status.clone()));
    }

    /// An action may start only on a live page with a loaded account and
    /// nothing else in flight.
    fn check_ready(&self, state: &ProfileState) -> Result<(), PageError> {
        self.scope.ensure_live()?;
        if !state.pending.is_idle() {
            return Err(PageError::ActionInFlight(state.pending));
        }
        if state.account.is_none() {
            return Err(PageError::NoAccount);
        }
        Ok(())
    }

    /// Drops the pending claim of an action abandoned by teardown.
    async fn settle<T>(&self, result: Result<T, PageError>) -> Result<T, PageError> {
        if result.is_err() {
            self.state.lock().await.pending = PendingAction::None;
            self.emit(PageEvent::PendingChanged(PendingAction::None));
        }
        result
    }

    fn emit(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for ProfilePage {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

#[cfg(test)]
#[path = "tests/account_manager_tests.rs"]
mod tests;
