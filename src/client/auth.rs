use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::{
    ApiClient,
    errors::Error,
    request::{Body, RequestOptions},
    token::{CredentialPatch, CredentialStore, RenewedToken},
    types::{Envelope, RefreshData, RefreshRequest, SignInRequest, SignInResponse},
};

impl ApiClient {
    /// Exchanges username and password for a token pair and stores it.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignInResponse, Error> {
        let body = Body::json(&SignInRequest { username, password })?;
        let login_path = self.ctx.login_path().to_string();
        let signed_in: SignInResponse = self
            .post(&login_path, body, RequestOptions::default())
            .await?;
        if signed_in.access_token.is_empty() || signed_in.refresh_token.is_empty() {
            return Err(Error::AuthRejected(
                "login response did not include a token pair".into(),
            ));
        }
        if signed_in.user_info.is_none() {
            return Err(Error::AuthRejected(
                "login response did not include user info".into(),
            ));
        }

        self.ctx.store().set(CredentialPatch {
            access_token: Some(signed_in.access_token.clone()),
            refresh_token: Some(signed_in.refresh_token.clone()),
            expires_at: Some(signed_in.expire_at),
        });
        info!(
            "signed in: user='{}' expires_at={:?}",
            username, signed_in.expire_at
        );
        Ok(signed_in)
    }

    pub fn sign_out(&self) {
        self.ctx.store().clear();
        info!("signed out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.store().get().is_authenticated()
    }

    pub fn credential_store(&self) -> Arc<dyn CredentialStore> {
        Arc::clone(self.ctx.store())
    }

    /// Refresh calls that reached the refresh endpoint over this client's lifetime.
    pub fn refresh_count(&self) -> u64 {
        self.ctx.guard().refresh_count()
    }
}

/// POSTs the refresh token and reads the renewed access token from the envelope.
pub(crate) async fn refresh_access_token(
    http_client: Client,
    url: String,
    refresh_token: String,
) -> Result<RenewedToken, Error> {
    let response = http_client
        .post(&url)
        .json(&RefreshRequest {
            refresh_token: &refresh_token,
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("refresh rejected: status={} body='{}'", status, body);
        return Err(Error::RefreshFailed(format!(
            "refresh token invalid (status {})",
            status
        )));
    }

    let envelope: Envelope<RefreshData> = response.json().await?;
    if envelope.is_success()
        && let Some(data) = envelope.data.as_ref()
        && let Some(access_token) = data.access_token.as_ref().filter(|t| !t.is_empty())
    {
        info!("access token renewed (len={})", access_token.len());
        return Ok(RenewedToken {
            access_token: access_token.clone(),
            expires_at: data.expire_at,
        });
    }

    let message = envelope
        .msg
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| "refresh failed".to_string());
    Err(Error::RefreshFailed(message))
}
