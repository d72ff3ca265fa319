use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::{
    ApiClient,
    config::Config,
    errors::Error,
    navigation::{LogNavigator, Navigator},
    request::{Body, Reply, RequestOptions, ResponseType},
    request_context::RequestDispatchContext,
    token::{CredentialStore, FileCredentialStore, MemoryCredentialStore},
    types::Envelope,
};

const REFRESH_TOKEN_HEADER: &str = "X-Refresh-Token";

/// A request rejected with 401 is re-sent at most this many times.
const MAX_AUTH_RETRIES: u8 = 1;

impl ApiClient {
    /// Create a new ApiClient
    /// # Arguments
    /// * `config` - Explicit configuration, typically loaded via `Config::from_file` or `Config::from_env`.
    /// * `store` - Where the session's tokens live.
    ///
    /// Unrecoverable auth failures are only logged; use `with_navigator` to
    /// send the user to the login screen.
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        Self::with_navigator(config, store, Arc::new(LogNavigator))
    }

    pub fn with_navigator(
        config: Config,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let ctx = RequestDispatchContext::build(&config, store, navigator)?;
        info!(
            "api client ready: base_url='{}' refresh_ahead_secs={}",
            config.base_url, config.refresh_ahead_secs
        );
        Ok(Self { ctx: Arc::new(ctx) })
    }

    /// Builds a client with a file-backed store when `credential_path` is
    /// set, in-memory otherwise.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let store: Arc<dyn CredentialStore> = match config.credential_path.as_deref() {
            Some(path) => Arc::new(FileCredentialStore::open(path)?),
            None => Arc::new(MemoryCredentialStore::default()),
        };
        Self::new(config, store)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.send(Method::GET, path, Body::Empty, options)
            .await?
            .into_data()
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.send(Method::POST, path, body.into(), options)
            .await?
            .into_data()
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.send(Method::PUT, path, body.into(), options)
            .await?
            .into_data()
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<T, Error> {
        self.send(Method::DELETE, path, body.into(), options)
            .await?
            .into_data()
    }

    /// GET returning the raw response body.
    pub async fn blob(&self, path: &str, options: RequestOptions) -> Result<Bytes, Error> {
        self.send(Method::GET, path, Body::Empty, options.as_blob())
            .await?
            .into_bytes()
    }

    /// Fetches `path` as binary and writes it to `dest`, returning the byte count.
    pub async fn download(&self, path: &str, dest: impl AsRef<Path>) -> Result<u64, Error> {
        let options = RequestOptions::default().with_header(
            ACCEPT,
            HeaderValue::from_static("application/octet-stream"),
        );
        let bytes = self.blob(path, options).await?;
        tokio::fs::write(dest.as_ref(), &bytes).await?;
        info!(
            "download ok: path='{}' dest='{}' bytes={}",
            path,
            dest.as_ref().display(),
            bytes.len()
        );
        Ok(bytes.len() as u64)
    }

    /// Runs one logical call through the credential pipeline.
    ///
    /// Stale credentials are renewed before dispatch. A 401 on an
    /// authenticated call triggers one refresh and one resend; a second 401
    /// logs the session out and redirects to the login screen.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Body,
        mut options: RequestOptions,
    ) -> Result<Reply, Error> {
        let needs_auth = !options.skip_auth && !self.ctx.is_allow_listed(path);
        let guard = self.ctx.guard();

        loop {
            if needs_auth {
                guard.ensure_fresh().await?;
            }
            // Read after the refresh settled; never reuse a token across awaits.
            let bearer = if needs_auth {
                self.ctx.store().get().access_token
            } else {
                None
            };

            let response = self
                .dispatch(&method, path, &body, &options, bearer.as_deref())
                .await?;

            if needs_auth && response.status() == StatusCode::UNAUTHORIZED {
                warn!(
                    "request rejected with 401: method={} path='{}' retry_count={}",
                    method, path, options.retry_count
                );
                if options.retry_count >= MAX_AUTH_RETRIES {
                    error!(
                        "authentication failed after token refresh; logging out: path='{}'",
                        path
                    );
                    // Concurrent callers can exhaust their retry together;
                    // only the one that ends the session redirects.
                    if self.ctx.store().clear() {
                        guard.redirect().fire();
                    }
                    return Err(Error::AuthRejected(format!(
                        "{} {} returned 401 after token refresh",
                        method, path
                    )));
                }
                options.retry_count += 1;
                guard.refresh_after_rejection(bearer.as_deref()).await?;
                continue;
            }

            return self
                .read_reply(&method, path, response, options.response_type)
                .await;
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: &Body,
        options: &RequestOptions,
        bearer: Option<&str>,
    ) -> Result<Response, Error> {
        let url = self.ctx.url(path);
        let mut request = self.ctx.http_client().request(method.clone(), &url);

        // Multipart bodies get their boundary header from the transport.
        if !body.is_form() {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
            if self.ctx.send_refresh_token_header() {
                let refresh_token = self.ctx.store().get().refresh_token.unwrap_or_default();
                request = request.header(REFRESH_TOKEN_HEADER, refresh_token);
            }
        }
        if !options.headers.is_empty() {
            request = request.headers(options.headers.clone());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(value),
            Body::Form(form) => request.multipart(form.to_multipart()?),
        };

        debug!(
            method = %method,
            path,
            authenticated = bearer.is_some(),
            retry_count = options.retry_count,
            "request.dispatch"
        );
        request
            .send()
            .await
            .map_err(|err| self.transport_error(err, options.timeout))
    }

    async fn read_reply(
        &self,
        method: &Method,
        path: &str,
        response: Response,
        response_type: ResponseType,
    ) -> Result<Reply, Error> {
        let status = response.status();
        match response_type {
            ResponseType::Blob => {
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    error!(
                        "download failed: path='{}' status={} body='{}'",
                        path, status, text
                    );
                    let message = if text.trim().is_empty() {
                        "download failed".to_string()
                    } else {
                        text
                    };
                    return Err(Error::Download(message));
                }
                let bytes = response.bytes().await?;
                debug!("blob received: path='{}' bytes={}", path, bytes.len());
                Ok(Reply::Blob(bytes))
            }
            ResponseType::Json => {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Err(if status.is_success() {
                        Error::EmptyResponse
                    } else {
                        Error::Http(status, text)
                    });
                }
                let envelope: Envelope = match serde_json::from_str(&text) {
                    Ok(envelope) => envelope,
                    Err(_) if !status.is_success() => return Err(Error::Http(status, text)),
                    Err(err) => return Err(Error::Json(err)),
                };
                if !envelope.is_success() {
                    warn!(
                        "business error: method={} path='{}' code={} msg='{}'",
                        method,
                        path,
                        envelope.code,
                        envelope.message()
                    );
                }
                envelope.into_data().map(Reply::Data)
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error, per_request: Option<Duration>) -> Error {
        match per_request.or(self.ctx.request_timeout()) {
            Some(timeout) if err.is_timeout() => Error::Timeout(timeout),
            _ => Error::Transport(err),
        }
    }
}
