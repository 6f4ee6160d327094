//! Error taxonomy shared by the API client and the controllers.

use thiserror::Error;

/// Failure of a single backend request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, timeout…).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response. `message` is the `error` field of the JSON body, if any.
    #[error("request failed with HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    /// 2xx response whose body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text for the user-facing notice: the server's own message for HTTP errors,
    /// `fallback` for everything else.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(m), ..
            } => m.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            ApiError::Status { .. } => NoticeKind::Http,
            ApiError::Transport(_) | ApiError::Decode(_) => NoticeKind::Network,
        }
    }
}

/// Which branch of the taxonomy produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Network,
    Http,
    Validation,
    /// A local step failed after a successful request (chart drawing, export).
    Internal,
}

/// The single blocking notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Validation,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Internal,
            message: message.into(),
        }
    }

    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        Self {
            kind: err.notice_kind(),
            message: err.user_message(fallback),
        }
    }
}
