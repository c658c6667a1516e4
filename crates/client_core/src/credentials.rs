//! Login and registration pages: local validation, submission, and mapping
//! of server failures to user-facing messages.

use std::{
    fmt,
    sync::{Arc, OnceLock},
    time::Duration,
};

use regex::Regex;
use shared::{
    error::ErrorCode,
    protocol::{LoginRequest, RegisterRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::PageError,
    events::{PageEvent, PAGE_EVENT_CAPACITY},
    lifecycle::PageScope,
    navigation::{Navigator, Route},
    session_resolver::{SessionResolver, SessionState},
    status::UiStatus,
    transport::{AuthApi, TransportError},
};

const EMAIL_PATTERN: &str = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

/// Server phrases recognised when an error carries no machine-readable code.
const KNOWN_FAILURE_PHRASES: &[(&str, FailureCategory)] = &[
    ("بيانات الدخول غير صحيحة", FailureCategory::InvalidCredentials),
    ("المستخدم غير موجود", FailureCategory::AccountNotFound),
    ("Email already exists", FailureCategory::DuplicateEmail),
];

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
}

impl FormKind {
    pub fn route(self) -> Route {
        match self {
            Self::Login => Route::Login,
            Self::Register => Route::Register,
        }
    }

    fn incomplete_message(self) -> &'static str {
        match self {
            Self::Login => "Please fill out the required fields.",
            Self::Register => "Please fill in all required fields.",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Self::Login => "Login successful! Redirecting...",
            Self::Register => {
                "Registration successful! You are being redirected to your profile..."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Email,
    Password,
    Username,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Username => "username",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }
}

/// Raw form input. `username` is only read by the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialFields {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl CredentialFields {
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: String::new(),
        }
    }

    pub fn register(
        email: impl Into<String>,
        password: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: username.into(),
        }
    }
}

/// Checks every field the form shows. Fields that are blank after trimming
/// count as missing.
pub fn validate(kind: FormKind, fields: &CredentialFields) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::default();

    if kind == FormKind::Register && fields.username.trim().is_empty() {
        report.push(Field::Username, "Username is required");
    }

    let email = fields.email.trim();
    if email.is_empty() {
        report.push(Field::Email, "Email required");
    } else if !is_valid_email(email) {
        report.push(Field::Email, "Enter a valid email address.");
    }

    if fields.password.trim().is_empty() {
        report.push(Field::Password, "Password required");
    }

    if report.is_empty() {
        Ok(())
    } else {
        Err(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    InvalidCredentials,
    AccountNotFound,
    DuplicateEmail,
    Generic,
}

impl FailureCategory {
    pub fn message(self, kind: FormKind) -> &'static str {
        match (self, kind) {
            (Self::InvalidCredentials, _) => "Incorrect email or password",
            (Self::AccountNotFound, _) => "No account exists with this email address.",
            (Self::DuplicateEmail, _) => {
                "This email address is already registered. Please log in."
            }
            (Self::Generic, FormKind::Login) => "An error occurred, please try again.",
            (Self::Generic, FormKind::Register) => {
                "An error occurred during registration. Please try again."
            }
        }
    }
}

/// Maps a failed submission to a category. The server's error code wins; the
/// message text is only inspected for servers that send no code.
pub fn classify_failure(err: &TransportError) -> FailureCategory {
    match err.code() {
        Some(ErrorCode::InvalidCredentials) => return FailureCategory::InvalidCredentials,
        Some(ErrorCode::AccountNotFound) => return FailureCategory::AccountNotFound,
        Some(ErrorCode::EmailTaken) => return FailureCategory::DuplicateEmail,
        Some(ErrorCode::Unknown) | None => {}
        Some(_) => return FailureCategory::Generic,
    }

    let Some(message) = err.server_message() else {
        return FailureCategory::Generic;
    };
    KNOWN_FAILURE_PHRASES
        .iter()
        .find(|(phrase, _)| message.contains(phrase))
        .map_or(FailureCategory::Generic, |(_, category)| *category)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blocked locally; nothing was sent.
    Invalid(ValidationReport),
    Failed(FailureCategory),
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialView {
    pub session: SessionState,
    pub submitting: bool,
    pub status: Option<UiStatus>,
}

impl CredentialView {
    /// The form is only shown once resolution has concluded there is no session.
    pub fn form_visible(&self) -> bool {
        self.session == SessionState::Unauthenticated
    }

    /// Fields and the submit control are disabled while a submission runs.
    pub fn controls_enabled(&self) -> bool {
        self.form_visible() && !self.submitting
    }
}

#[derive(Default)]
struct CredentialPageState {
    session: SessionState,
    submitting: bool,
    status: Option<UiStatus>,
}

/// Controller behind the login and registration pages.
pub struct CredentialPage {
    kind: FormKind,
    api: Arc<dyn AuthApi>,
    resolver: SessionResolver,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    scope: PageScope,
    state: Mutex<CredentialPageState>,
    events: broadcast::Sender<PageEvent>,
}

impl CredentialPage {
    pub fn new(
        kind: FormKind,
        api: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
        redirect_delay: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(PAGE_EVENT_CAPACITY);
        Self {
            kind,
            resolver: SessionResolver::new(Arc::clone(&api)),
            api,
            navigator,
            redirect_delay,
            scope: PageScope::mount(),
            state: Mutex::new(CredentialPageState::default()),
            events,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    /// Resolves the session. An existing session sends the visitor straight
    /// to the profile without the form ever becoming visible.
    pub async fn mount(&self) -> Result<SessionState, PageError> {
        let session = self.resolver.resolve(&self.scope).await?;
        self.state.lock().await.session = session.clone();
        self.emit(PageEvent::SessionResolved(session.clone()));

        if matches!(session, SessionState::Authenticated(_)) {
            self.navigator.navigate(Route::Profile);
        }
        Ok(session)
    }

    pub async fn submit(&self, fields: CredentialFields) -> Result<SubmitOutcome, PageError> {
        {
            let mut state = self.state.lock().await;
            self.scope.ensure_live()?;
            if state.session != SessionState::Unauthenticated {
                return Err(PageError::FormUnavailable);
            }
            if state.submitting {
                return Err(PageError::SubmissionInFlight);
            }
            if let Err(report) = validate(self.kind, &fields) {
                let status = Some(UiStatus::error(self.kind.incomplete_message()));
                state.status.clone_from(&status);
                self.emit(PageEvent::StatusChanged(status));
                return Ok(SubmitOutcome::Invalid(report));
            }
            state.submitting = true;
            state.status = None;
        }
        self.emit(PageEvent::SubmittingChanged(true));
        self.emit(PageEvent::StatusChanged(None));

        let result = match self.send(&fields).await {
            Ok(result) => result,
            Err(err) => {
                self.state.lock().await.submitting = false;
                self.emit(PageEvent::SubmittingChanged(false));
                return Err(err);
            }
        };

        let (outcome, status) = match result {
            Ok(()) => {
                info!(form = ?self.kind, "credentials accepted");
                (
                    SubmitOutcome::Succeeded,
                    UiStatus::success(self.kind.success_message()),
                )
            }
            Err(err) => {
                let category = classify_failure(&err);
                warn!(form = ?self.kind, ?category, "credentials rejected: {err}");
                (
                    SubmitOutcome::Failed(category),
                    UiStatus::error(category.message(self.kind)),
                )
            }
        };

        {
            let mut state = self.state.lock().await;
            state.submitting = false;
            state.status = Some(status.clone());
        }
        self.emit(PageEvent::SubmittingChanged(false));
        self.emit(PageEvent::StatusChanged(Some(status)));

        if outcome == SubmitOutcome::Succeeded {
            self.scope.sleep(self.redirect_delay).await?;
            self.navigator.navigate(Route::Profile);
        }
        Ok(outcome)
    }

    pub async fn dismiss_status(&self) {
        self.state.lock().await.status = None;
        self.emit(PageEvent::StatusChanged(None));
    }

    pub async fn snapshot(&self) -> CredentialView {
        let state = self.state.lock().await;
        CredentialView {
            session: state.session.clone(),
            submitting: state.submitting,
            status: state.status.clone(),
        }
    }

    /// Tears the page down; in-flight work finishes as [`PageError::Cancelled`].
    pub fn unmount(&self) {
        self.scope.teardown();
    }

    async fn send(
        &self,
        fields: &CredentialFields,
    ) -> Result<Result<(), TransportError>, PageError> {
        let email = fields.email.trim().to_string();
        match self.kind {
            FormKind::Login => {
                let request = LoginRequest {
                    email,
                    password: fields.password.clone(),
                };
                self.scope.guard(self.api.login(&request)).await
            }
            FormKind::Register => {
                let request = RegisterRequest {
                    email,
                    password: fields.password.clone(),
                    username: fields.username.trim().to_string(),
                };
                self.scope.guard(self.api.register(&request)).await
            }
        }
    }

    fn emit(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for CredentialPage {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
