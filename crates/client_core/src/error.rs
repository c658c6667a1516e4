use thiserror::Error;

use crate::account_manager::PendingAction;

/// Why a page operation did not run to completion.
///
/// Server and validation failures are not errors at this level: they end in a
/// status banner on the page. These variants cover the cases where the page
/// itself refused or abandoned the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page was unmounted before the operation completed")]
    Cancelled,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("cannot start a new action while {0} is in progress")]
    ActionInFlight(PendingAction),
    #[error("the form is only available once the visitor is known to be signed out")]
    FormUnavailable,
    #[error("no account is loaded on this page")]
    NoAccount,
}
