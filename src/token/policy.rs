use std::time::Duration;

use crate::errors::Error;

use super::Credential;

/// Decides when a stored access token must be renewed before use.
#[derive(Clone, Debug)]
pub struct RefreshPolicy {
    /// Window before expiry inside which the token is already treated as stale.
    pub ahead: Duration,
}

impl RefreshPolicy {
    pub fn new(ahead: Duration) -> Result<Self, Error> {
        if ahead.is_zero() {
            return Err(Error::Config("Refresh window must be > 0".into()));
        }
        Ok(Self { ahead })
    }

    /// A missing access token or a missing expiry is always stale.
    pub fn is_stale(&self, credential: &Credential, now: i64) -> bool {
        match (&credential.access_token, credential.expires_at) {
            (Some(_), Some(expires_at)) => {
                expires_at < now.saturating_add(self.ahead.as_secs() as i64)
            }
            _ => true,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            ahead: Duration::from_secs(5 * 60),
        }
    }
}
