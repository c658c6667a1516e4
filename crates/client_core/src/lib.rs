//! Client side of the cookie-session auth flow.
//!
//! Each page of the flow is a controller with an explicit mount/unmount
//! lifecycle: [`CredentialPage`] for login and registration, [`ProfilePage`]
//! for the signed-in account. Both talk to the auth server through the
//! [`AuthApi`] seam; [`HttpAuthApi`] is the production implementation.

use std::{sync::Arc, time::Duration};

pub mod account_manager;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod navigation;
pub mod session_resolver;
pub mod status;
pub mod transport;

pub use account_manager::{ActionOutcome, PendingAction, ProfilePage, ProfileView};
pub use config::{load_settings, load_settings_from, ClientSettings};
pub use credentials::{
    CredentialFields, CredentialPage, CredentialView, FailureCategory, FormKind, SubmitOutcome,
    ValidationReport,
};
pub use error::PageError;
pub use events::PageEvent;
pub use lifecycle::PageScope;
pub use navigation::{Confirmer, Navigator, Route};
pub use session_resolver::{SessionResolver, SessionState};
pub use status::{StatusKind, UiStatus};
pub use transport::{AuthApi, HttpAuthApi, TransportError};

/// Builds page controllers that share one transport, and with it one session
/// cookie store.
#[derive(Clone)]
pub struct AuthClient {
    api: Arc<dyn AuthApi>,
    redirect_delay: Duration,
}

impl AuthClient {
    pub fn new(api: Arc<dyn AuthApi>, redirect_delay: Duration) -> Self {
        Self {
            api,
            redirect_delay,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let api = HttpAuthApi::new(settings)?;
        Ok(Self::new(Arc::new(api), settings.redirect_delay()))
    }

    pub fn api(&self) -> Arc<dyn AuthApi> {
        Arc::clone(&self.api)
    }

    pub fn login_page(&self, navigator: Arc<dyn Navigator>) -> CredentialPage {
        CredentialPage::new(
            FormKind::Login,
            self.api(),
            navigator,
            self.redirect_delay,
        )
    }

    pub fn register_page(&self, navigator: Arc<dyn Navigator>) -> CredentialPage {
        CredentialPage::new(
            FormKind::Register,
            self.api(),
            navigator,
            self.redirect_delay,
        )
    }

    pub fn profile_page(
        &self,
        navigator: Arc<dyn Navigator>,
        confirmer: Arc<dyn Confirmer>,
    ) -> ProfilePage {
        ProfilePage::new(self.api(), navigator, confirmer)
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
