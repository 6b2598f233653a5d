use std::sync::Arc;

use platform_authz::AuthzError;
use platform_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Result of a user action.
pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a user action can fail with. Only "connection failed" and
/// "operation failed" are distinguished beyond input and permission problems.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("not allowed: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("connection failed: {0:#}")]
    Connection(Arc<anyhow::Error>),
    #[error("{0:#}")]
    Operation(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Connection(_) => "CONNECTION",
            ApiError::Operation(_) => "OPERATION",
        }
    }

    pub fn connection(err: impl Into<anyhow::Error>) -> Self {
        Self::Connection(Arc::new(err.into()))
    }

    pub fn operation(err: impl Into<anyhow::Error>) -> Self {
        Self::Operation(Arc::new(err.into()))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// The modal notice for a failed action, e.g. `"Save failed: ..."`.
    pub fn notice(&self, action: &str) -> Notice {
        tracing::warn!(code = self.code(), error = %self, action, "action failed");
        Notice::error(action, format!("{action} failed: {self}"))
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Query(_) => Self::operation(value),
            _ => Self::connection(value),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(value: AuthzError) -> Self {
        Self::Unauthorized(value.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::operation(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A blocking message shown for the outcome of a user action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.title, self.message)
    }
}
