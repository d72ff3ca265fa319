use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, error};

use crate::errors::Error;
use crate::navigation::LoginRedirect;
use crate::telemetry::refresh::{RefreshTelemetry, RefreshTrigger};

use super::{CredentialPatch, CredentialStore, RefreshPolicy, credential::unix_now};

/// Convenience result alias for guard operations.
pub type TokenGuardResult<T> = Result<T, Error>;

/// What a successful refresh call hands back.
#[derive(Clone, Debug)]
pub struct RenewedToken {
    pub access_token: String,
    pub expires_at: Option<i64>,
}

/// Outcome shared by every caller waiting on the same refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshFailure {
    MissingRefreshToken,
    Rejected(String),
}

impl RefreshFailure {
    fn from_error(err: Error) -> Self {
        match err {
            Error::RefreshFailed(msg) => RefreshFailure::Rejected(msg),
            other => RefreshFailure::Rejected(other.to_string()),
        }
    }
}

impl From<RefreshFailure> for Error {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::MissingRefreshToken => Error::StaleRefreshToken,
            RefreshFailure::Rejected(msg) => Error::RefreshFailed(msg),
        }
    }
}

/// Exchanges a refresh token for a new access token.
pub type RefreshFn =
    Arc<dyn Fn(String) -> BoxFuture<'static, TokenGuardResult<RenewedToken>> + Send + Sync>;

type InflightRefresh = Shared<BoxFuture<'static, Result<(), RefreshFailure>>>;

/// Configuration inputs required to build a TokenGuard.
#[derive(Clone, Default)]
pub struct TokenGuardConfig {
    pub policy: RefreshPolicy,
    pub redirect: LoginRedirect,
}

/// Single-flight coordinator for access token renewal.
///
/// At most one refresh call is outstanding per guard. Callers that find the
/// token stale while a refresh is running await the same shared result, so
/// the store write on success (or the logout and login redirect on failure)
/// happens once no matter how many callers are waiting. A logout only
/// redirects when it is the one that emptied the store.
pub struct TokenGuard {
    store: Arc<dyn CredentialStore>,
    refresh: RefreshFn,
    policy: RefreshPolicy,
    redirect: LoginRedirect,
    inflight: Mutex<Option<InflightRefresh>>,
    refreshes: Arc<AtomicU64>,
}

impl TokenGuard {
    pub fn new<F, Fut>(store: Arc<dyn CredentialStore>, refresh: F, config: TokenGuardConfig) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TokenGuardResult<RenewedToken>> + Send + 'static,
    {
        let refresh: RefreshFn = Arc::new(move |refresh_token| refresh(refresh_token).boxed());
        Self {
            store,
            refresh,
            policy: config.policy,
            redirect: config.redirect,
            inflight: Mutex::new(None),
            refreshes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> Arc<dyn CredentialStore> {
        Arc::clone(&self.store)
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    pub fn redirect(&self) -> &LoginRedirect {
        &self.redirect
    }

    /// Number of refresh calls that reached the refresh transport.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn is_stale(&self) -> bool {
        self.policy.is_stale(&self.store.get(), unix_now())
    }

    /// Renews the access token first if it is missing or about to expire.
    pub async fn ensure_fresh(&self) -> TokenGuardResult<()> {
        if !self.is_stale() {
            return Ok(());
        }
        debug!("access token stale; refresh required");
        self.join_or_start(RefreshTrigger::Stale).await
    }

    /// Renews the access token after the server rejected `rejected`.
    ///
    /// When the store already holds a different token, another caller has
    /// rotated it since the request went out and no refresh is issued. When
    /// the store is empty, the session already ended (and redirected) while
    /// this request was in flight.
    pub async fn refresh_after_rejection(&self, rejected: Option<&str>) -> TokenGuardResult<()> {
        let credential = self.store.get();
        if credential.is_empty() {
            debug!("session ended while request was in flight; not refreshing");
            return Err(Error::StaleRefreshToken);
        }
        let current = credential.access_token;
        if let (Some(rejected), Some(current)) = (rejected, current.as_deref())
            && rejected != current
        {
            debug!("access token rotated since rejection; skipping refresh");
            return Ok(());
        }
        self.join_or_start(RefreshTrigger::Rejected).await
    }

    async fn join_or_start(&self, trigger: RefreshTrigger) -> TokenGuardResult<()> {
        let pending = {
            let mut slot = self.inflight.lock().unwrap_or_else(|p| p.into_inner());
            // A settled leftover is never joined; it would replay an old outcome.
            let joinable = slot
                .as_ref()
                .filter(|pending| pending.peek().is_none())
                .cloned();
            match joinable {
                Some(pending) => {
                    RefreshTelemetry::emit_join(trigger);
                    pending
                }
                None => {
                    let pending = self.start_refresh(trigger);
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        {
            let mut slot = self.inflight.lock().unwrap_or_else(|p| p.into_inner());
            if slot
                .as_ref()
                .is_some_and(|current| current.ptr_eq(&pending))
            {
                *slot = None;
            }
        }

        outcome.map_err(Error::from)
    }

    fn start_refresh(&self, trigger: RefreshTrigger) -> InflightRefresh {
        let store = Arc::clone(&self.store);
        let refresh = Arc::clone(&self.refresh);
        let redirect = self.redirect.clone();
        let refreshes = Arc::clone(&self.refreshes);

        async move {
            let telemetry = RefreshTelemetry::new(trigger);
            let Some(refresh_token) = store.get().refresh_token else {
                error!("no refresh token in credential store; clearing session");
                // A rejected request carried a session that someone else has
                // already ended and redirected for.
                if store.clear() || matches!(trigger, RefreshTrigger::Stale) {
                    redirect.fire();
                }
                return Err(RefreshFailure::MissingRefreshToken);
            };

            telemetry.emit_start();
            refreshes.fetch_add(1, Ordering::SeqCst);
            match refresh(refresh_token).await {
                Ok(renewed) => {
                    let expires_at = renewed.expires_at;
                    store.set(CredentialPatch {
                        access_token: Some(renewed.access_token),
                        refresh_token: None,
                        expires_at: Some(expires_at),
                    });
                    telemetry.emit_success(expires_at);
                    Ok(())
                }
                Err(err) => {
                    telemetry.emit_failure(&err);
                    if store.clear() {
                        redirect.fire();
                    }
                    Err(RefreshFailure::from_error(err))
                }
            }
        }
        .boxed()
        .shared()
    }
}
