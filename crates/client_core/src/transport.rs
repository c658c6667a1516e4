use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::Account,
    error::{ApiError, ErrorCode},
    protocol::{
        AccountEnvelope, LoginRequest, RegisterRequest, UpdateAccountRequest, DELETE_PATH,
        LOGIN_PATH, LOGOUT_PATH, ME_PATH, REFRESH_PATH, REGISTER_PATH, UPDATE_PATH,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ClientSettings;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server rejected request with status {status}: {error}")]
    Rejected { status: u16, error: ApiError },
    #[error("request failed: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

impl TransportError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Rejected { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.api_error().and_then(|error| error.code)
    }

    /// Human message supplied by the server, if any.
    pub fn server_message(&self) -> Option<String> {
        self.api_error().and_then(ApiError::message_text)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The remote auth authority, as seen by the page controllers.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn me(&self) -> Result<Account, TransportError>;
    async fn refresh(&self) -> Result<(), TransportError>;
    async fn login(&self, request: &LoginRequest) -> Result<(), TransportError>;
    async fn register(&self, request: &RegisterRequest) -> Result<(), TransportError>;
    async fn update_account(
        &self,
        request: &UpdateAccountRequest,
    ) -> Result<Account, TransportError>;
    async fn logout(&self) -> Result<(), TransportError>;
    async fn delete_account(&self) -> Result<(), TransportError>;
}

/// [`AuthApi`] over HTTP. One cookie store is shared by every request, which
/// is how the session cookie set by login/refresh rides along on later calls.
#[derive(Clone)]
pub struct HttpAuthApi {
    http: Client,
    base_url: Url,
}

impl HttpAuthApi {
    pub fn new(settings: &ClientSettings) -> anyhow::Result<Self> {
        let base_url = settings.base_url()?;
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;
        Ok(Self { http, base_url })
    }

    /// Uses a caller-built client. The client must have a cookie store for
    /// sessions to survive between calls.
    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|_| TransportError::InvalidEndpoint(path.to_string()))
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "auth api response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(TransportError::Rejected {
            status: status.as_u16(),
            error: ApiError::from_body(&body),
        })
    }

    async fn read_account(response: Response) -> Result<Account, TransportError> {
        response
            .json::<AccountEnvelope>()
            .await
            .map(AccountEnvelope::into_account)
            .map_err(|err| TransportError::Decode(err.to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn me(&self) -> Result<Account, TransportError> {
        let url = self.endpoint(ME_PATH)?;
        let response = self.send(ME_PATH, self.http.get(url)).await?;
        Self::read_account(response).await
    }

    async fn refresh(&self) -> Result<(), TransportError> {
        let url = self.endpoint(REFRESH_PATH)?;
        self.send(REFRESH_PATH, self.http.post(url)).await?;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<(), TransportError> {
        let url = self.endpoint(LOGIN_PATH)?;
        self.send(LOGIN_PATH, self.http.post(url).json(request)).await?;
        Ok(())
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), TransportError> {
        let url = self.endpoint(REGISTER_PATH)?;
        self.send(REGISTER_PATH, self.http.post(url).json(request)).await?;
        Ok(())
    }

    async fn update_account(
        &self,
        request: &UpdateAccountRequest,
    ) -> Result<Account, TransportError> {
        let url = self.endpoint(UPDATE_PATH)?;
        let response = self
            .send(UPDATE_PATH, self.http.put(url).json(request))
            .await?;
        Self::read_account(response).await
    }

    async fn logout(&self) -> Result<(), TransportError> {
        let url = self.endpoint(LOGOUT_PATH)?;
        self.send(LOGOUT_PATH, self.http.post(url)).await?;
        Ok(())
    }

    async fn delete_account(&self) -> Result<(), TransportError> {
        let url = self.endpoint(DELETE_PATH)?;
        self.send(DELETE_PATH, self.http.delete(url)).await?;
        Ok(())
    }
}
