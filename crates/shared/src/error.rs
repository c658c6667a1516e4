use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure reason carried next to the human message.
///
/// Servers that predate error codes simply omit the field; codes this client
/// does not know decode as [`ErrorCode::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidCredentials,
    AccountNotFound,
    EmailTaken,
    Unauthorized,
    Validation,
    Internal,
    #[serde(other)]
    Unknown,
}

/// `message` as sent by the server: a single string, or a list of strings
/// when a validation pipe reports several problems at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    pub fn text(&self) -> String {
        match self {
            Self::Single(message) => message.clone(),
            Self::Many(messages) => messages.join("; "),
        }
    }
}

/// Error body returned by the auth API. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", self.describe())]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ErrorMessage>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: Some(ErrorMessage::Single(message.into())),
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: Some(ErrorMessage::Single(message.into())),
        }
    }

    /// Decodes an error body, treating anything that is not a JSON object of
    /// the expected shape as "no code, no message".
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Server message, or `None` when absent or blank.
    pub fn message_text(&self) -> Option<String> {
        self.message
            .as_ref()
            .map(ErrorMessage::text)
            .filter(|text| !text.trim().is_empty())
    }

    fn describe(&self) -> String {
        match (self.code, self.message_text()) {
            (Some(code), Some(message)) => format!("{code:?}: {message}"),
            (Some(code), None) => format!("{code:?}"),
            (None, Some(message)) => message,
            (None, None) => "no error details".to_string(),
        }
    }
}
