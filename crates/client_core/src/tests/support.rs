//! In-memory fakes for page controller tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex as StdMutex},
};

use async_trait::async_trait;
use shared::{
    domain::{Account, AccountId},
    error::{ApiError, ErrorCode},
    protocol::{LoginRequest, RegisterRequest, UpdateAccountRequest},
};
use tokio::sync::Notify;

use crate::{
    navigation::{Confirmer, Navigator, Route},
    transport::{AuthApi, TransportError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Me,
    Refresh,
    Login(LoginRequest),
    Register(RegisterRequest),
    Update(UpdateAccountRequest),
    Logout,
    Delete,
}

type Reply<T> = Result<T, TransportError>;

/// Replies with queued results per endpoint and records every call. An
/// unscripted call fails with a network error.
#[derive(Default)]
pub struct ScriptedAuthApi {
    calls: StdMutex<Vec<ApiCall>>,
    me: StdMutex<VecDeque<Reply<Account>>>,
    refresh: StdMutex<VecDeque<Reply<()>>>,
    login: StdMutex<VecDeque<Reply<()>>>,
    register: StdMutex<VecDeque<Reply<()>>>,
    update: StdMutex<VecDeque<Reply<Account>>>,
    logout: StdMutex<VecDeque<Reply<()>>>,
    delete: StdMutex<VecDeque<Reply<()>>>,
    hold: StdMutex<Option<Arc<Notify>>>,
}

impl ScriptedAuthApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_me(&self, reply: Reply<Account>) {
        self.me.lock().expect("me").push_back(reply);
    }

    pub fn push_refresh(&self, reply: Reply<()>) {
        self.refresh.lock().expect("refresh").push_back(reply);
    }

    pub fn push_login(&self, reply: Reply<()>) {
        self.login.lock().expect("login").push_back(reply);
    }

    pub fn push_register(&self, reply: Reply<()>) {
        self.register.lock().expect("register").push_back(reply);
    }

    pub fn push_update(&self, reply: Reply<Account>) {
        self.update.lock().expect("update").push_back(reply);
    }

    pub fn push_logout(&self, reply: Reply<()>) {
        self.logout.lock().expect("logout").push_back(reply);
    }

    pub fn push_delete(&self, reply: Reply<()>) {
        self.delete.lock().expect("delete").push_back(reply);
    }

    /// Every later call is recorded immediately but only answers once `gate`
    /// is notified.
    pub fn hold_until(&self, gate: Arc<Notify>) {
        *self.hold.lock().expect("hold") = Some(gate);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("calls").clone()
    }

    async fn enter(&self, call: ApiCall) {
        self.calls.lock().expect("calls").push(call);
        let gate = self.hold.lock().expect("hold").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn pop<T>(queue: &StdMutex<VecDeque<Reply<T>>>, endpoint: &str) -> Reply<T> {
        queue
            .lock()
            .expect("queue")
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Network(format!("unscripted call to {endpoint}")))
            })
    }
}

#[async_trait]
impl AuthApi for ScriptedAuthApi {
    async fn me(&self) -> Result<Account, TransportError> {
        self.enter(ApiCall::Me).await;
        Self::pop(&self.me, "me")
    }

    async fn refresh(&self) -> Result<(), TransportError> {
        self.enter(ApiCall::Refresh).await;
        Self::pop(&self.refresh, "refresh")
    }

    async fn login(&self, request: &LoginRequest) -> Result<(), TransportError> {
        self.enter(ApiCall::Login(request.clone())).await;
        Self::pop(&self.login, "login")
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), TransportError> {
        self.enter(ApiCall::Register(request.clone())).await;
        Self::pop(&self.register, "register")
    }

    async fn update_account(
        &self,
        request: &UpdateAccountRequest,
    ) -> Result<Account, TransportError> {
        self.enter(ApiCall::Update(request.clone())).await;
        Self::pop(&self.update, "update")
    }

    async fn logout(&self) -> Result<(), TransportError> {
        self.enter(ApiCall::Logout).await;
        Self::pop(&self.logout, "logout")
    }

    async fn delete_account(&self) -> Result<(), TransportError> {
        self.enter(ApiCall::Delete).await;
        Self::pop(&self.delete, "delete")
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: StdMutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("routes").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("routes").push(route);
    }
}

pub struct FixedConfirmer {
    answer: bool,
    prompts: StdMutex<Vec<String>>,
}

impl FixedConfirmer {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: StdMutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts").clone()
    }
}

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().expect("prompts").push(prompt.to_string());
        self.answer
    }
}

pub fn account(username: Option<&str>) -> Account {
    Account {
        id: AccountId("acc-1".to_string()),
        email: "a@b.com".to_string(),
        username: username.map(str::to_string),
    }
}

pub fn rejected(status: u16, message: Option<&str>) -> TransportError {
    TransportError::Rejected {
        status,
        error: ApiError {
            code: None,
            message: message.map(|m| shared::error::ErrorMessage::Single(m.to_string())),
        },
    }
}

pub fn rejected_with_code(status: u16, code: ErrorCode, message: &str) -> TransportError {
    TransportError::Rejected {
        status,
        error: ApiError::new(code, message),
    }
}

pub fn unauthorized() -> TransportError {
    rejected(401, Some("Unauthorized"))
}
