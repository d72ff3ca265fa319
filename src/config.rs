//! read client configuration from a file or the environment

use std::time::Duration;

use crate::errors::Error;
use crate::path;

pub enum ConfigLocation {
    File(String),
    Env,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_login_redirect")]
    pub login_redirect: String,
    #[serde(default = "default_refresh_ahead_secs")]
    pub refresh_ahead_secs: u64,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub send_refresh_token_header: bool,
    #[serde(default)]
    pub credential_path: Option<String>,
}

fn default_login_path() -> String {
    path::AUTH_LOGIN.to_string()
}

fn default_refresh_path() -> String {
    path::AUTH_REFRESH.to_string()
}

fn default_login_redirect() -> String {
    "/login".to_string()
}

fn default_refresh_ahead_secs() -> u64 {
    5 * 60
}

impl Config {
    /// Defaults for everything except the API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            login_redirect: default_login_redirect(),
            refresh_ahead_secs: default_refresh_ahead_secs(),
            request_timeout_secs: None,
            send_refresh_token_header: false,
            credential_path: None,
        }
    }

    pub fn load(loc: ConfigLocation) -> Result<Self, Error> {
        match loc {
            ConfigLocation::File(path) => Self::from_file(path),
            ConfigLocation::Env => Self::from_env(),
        }
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("CCOPS_API_URL")
            .map_err(|_| Error::Config("Missing CCOPS_API_URL env var".to_string()))?;
        let mut config = Config::new(base_url);
        if let Ok(value) = std::env::var("CCOPS_LOGIN_PATH") {
            config.login_path = value;
        }
        if let Ok(value) = std::env::var("CCOPS_REFRESH_PATH") {
            config.refresh_path = value;
        }
        if let Ok(value) = std::env::var("CCOPS_LOGIN_REDIRECT") {
            config.login_redirect = value;
        }
        if let Ok(value) = std::env::var("CCOPS_REFRESH_AHEAD_SECS") {
            config.refresh_ahead_secs = parse_env("CCOPS_REFRESH_AHEAD_SECS", &value)?;
        }
        if let Ok(value) = std::env::var("CCOPS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = Some(parse_env("CCOPS_REQUEST_TIMEOUT_SECS", &value)?);
        }
        if let Ok(value) = std::env::var("CCOPS_SEND_REFRESH_HEADER") {
            config.send_refresh_token_header = parse_env("CCOPS_SEND_REFRESH_HEADER", &value)?;
        }
        config.credential_path = std::env::var("CCOPS_CREDENTIAL_PATH").ok();
        Ok(config)
    }

    pub fn refresh_ahead(&self) -> Duration {
        Duration::from_secs(self.refresh_ahead_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value '{}' for {}", value, name)))
}
