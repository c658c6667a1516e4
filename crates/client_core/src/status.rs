use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Transient banner shown to the user. A page holds at most one; every state
/// change replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl UiStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl fmt::Display for UiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            StatusKind::Success => "ok",
            StatusKind::Error => "error",
        };
        write!(f, "[{label}] {}", self.message)
    }
}
