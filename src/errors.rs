use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Transport(reqwest::Error),
    Timeout(Duration),
    Config(String),
    /// No refresh token was available when a refresh was required.
    StaleRefreshToken,
    RefreshFailed(String),
    Business { code: i64, message: String },
    AuthRejected(String),
    Download(String),
    Http(StatusCode, String),
    EmptyResponse,
    Decode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Json(err) => write!(f, "json error: {}", err),
            Error::Transport(err) => write!(f, "transport error: {}", err),
            Error::Timeout(after) => write!(f, "request timed out after {:?}", after),
            Error::Config(msg) => write!(f, "config error: {}", msg),
            Error::StaleRefreshToken => write!(f, "no refresh token available"),
            Error::RefreshFailed(msg) => write!(f, "token refresh failed: {}", msg),
            Error::Business { code, message } => write!(f, "{} (code {})", message, code),
            Error::AuthRejected(msg) => write!(f, "authentication failed: {}", msg),
            Error::Download(msg) => write!(f, "{}", msg),
            Error::Http(status, body) => write!(f, "unexpected status {}: {}", status, body),
            Error::EmptyResponse => write!(f, "empty response received"),
            Error::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    /// True for failures that logged the session out.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::StaleRefreshToken | Error::RefreshFailed(_) | Error::AuthRejected(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err)
    }
}
