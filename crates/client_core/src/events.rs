//! State-change notifications published by page controllers.

use shared::domain::Account;

use crate::{account_manager::PendingAction, session_resolver::SessionState, status::UiStatus};

/// Capacity of each page's event channel. Slow subscribers lag rather than
/// block the page.
pub(crate) const PAGE_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    SessionResolved(SessionState),
    StatusChanged(Option<UiStatus>),
    SubmittingChanged(bool),
    PendingChanged(PendingAction),
    AccountChanged(Option<Account>),
}
