use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::client::refresh_access_token;
use crate::config::Config;
use crate::errors::Error;
use crate::navigation::{LoginRedirect, Navigator};
use crate::path::without_query;
use crate::token::{CredentialStore, RefreshPolicy, TokenGuard, TokenGuardConfig};

const USER_AGENT: &str = "ccops-client/0.1.0";

/// Shared context for outbound requests ensuring consistent token handling.
pub(crate) struct RequestDispatchContext {
    http_client: Client,
    base_url: String,
    login_path: String,
    refresh_path: String,
    send_refresh_token_header: bool,
    request_timeout: Option<Duration>,
    store: Arc<dyn CredentialStore>,
    guard: Arc<TokenGuard>,
}

impl RequestDispatchContext {
    pub fn build(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let base_url = if config.base_url.starts_with("http") {
            config.base_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", config.base_url.trim_end_matches('/'))
        };
        reqwest::Url::parse(&base_url).map_err(|e| {
            Error::Config(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;

        let request_timeout = config.request_timeout();
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let policy = RefreshPolicy::new(config.refresh_ahead())?;
        let redirect = LoginRedirect::new(navigator, config.login_redirect.clone());
        let refresh_url = join_url(&base_url, &config.refresh_path);
        let refresh_client = http_client.clone();
        let guard = TokenGuard::new(
            Arc::clone(&store),
            move |refresh_token| {
                refresh_access_token(refresh_client.clone(), refresh_url.clone(), refresh_token)
            },
            TokenGuardConfig { policy, redirect },
        );

        Ok(Self {
            http_client,
            base_url,
            login_path: config.login_path.clone(),
            refresh_path: config.refresh_path.clone(),
            send_refresh_token_header: config.send_refresh_token_header,
            request_timeout,
            store,
            guard: Arc::new(guard),
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Login and refresh endpoints never go through the credential pipeline.
    pub fn is_allow_listed(&self, path: &str) -> bool {
        let bare = without_query(path);
        bare == self.login_path || bare == self.refresh_path
    }

    pub fn send_refresh_token_header(&self) -> bool {
        self.send_refresh_token_header
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn guard(&self) -> Arc<TokenGuard> {
        Arc::clone(&self.guard)
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
