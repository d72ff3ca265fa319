use serde::{Deserialize, Serialize};

/// Token pair plus the access token's expiry, as persisted between sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Epoch seconds; only meaningful while `access_token` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_at.is_none()
    }

    pub fn apply(&mut self, patch: CredentialPatch) {
        if let Some(access_token) = patch.access_token {
            self.access_token = Some(access_token);
        }
        if let Some(refresh_token) = patch.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
    }
}

/// Partial credential write. `None` fields are left untouched;
/// `expires_at: Some(None)` clears a previously recorded expiry.
#[derive(Clone, Debug, Default)]
pub struct CredentialPatch {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Option<i64>>,
}

impl From<Credential> for CredentialPatch {
    fn from(credential: Credential) -> Self {
        Self {
            access_token: credential.access_token,
            refresh_token: credential.refresh_token,
            expires_at: Some(credential.expires_at),
        }
    }
}

pub(crate) fn unix_now() -> i64 {
    jiff::Timestamp::now().as_second()
}
