use axum::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = axum::Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Failures of the auth and query calls.
#[derive(Debug)]
pub enum FetchError {
    /// Bad credentials or an auth response without a usable token.
    Auth(String),
    /// Transport failure or non-success status on a query call.
    Network(String),
    /// Well-formed profile response without any user record.
    Data(String),
    /// Response that could not be decoded into the expected shape.
    Format(String),
}

impl FetchError {
    /// Whether the stored token should be dropped and the user sent back to sign-in.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Data(_))
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Auth(msg) => write!(f, "auth error: {msg}"),
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Data(msg) => write!(f, "data error: {msg}"),
            FetchError::Format(msg) => write!(f, "format error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Reason a single record was left out of a rendered list or chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderError {
    pub index: usize,
    pub reason: String,
}

impl RenderError {
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} skipped: {}", self.index, self.reason)
    }
}

impl std::error::Error for RenderError {}
