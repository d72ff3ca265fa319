use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;

/// Envelope code the server uses for success.
pub const SUCCESS_CODE: i64 = 0;

const FALLBACK_MESSAGE: &str = "request failed";

/// Uniform `{code, data, msg}` wrapper around every non-binary response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Server message, or a generic fallback when it is missing or blank.
    pub fn message(&self) -> String {
        match self.msg.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg.to_string(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl Envelope<Value> {
    pub fn into_data(self) -> Result<Value, Error> {
        if self.is_success() {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(Error::Business {
                code: self.code,
                message: self.message(),
            })
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expire_at: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expire_at: Option<i64>,
    #[serde(default)]
    pub user_info: Option<Value>,
}
