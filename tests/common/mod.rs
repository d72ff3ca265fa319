#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ccops_client::token::{Credential, MemoryCredentialStore};
use ccops_client::{ApiClient, Config};
use serde_json::{Value, json};

pub fn now() -> i64 {
    jiff::Timestamp::now().as_second()
}

pub fn ok_envelope(data: Value) -> Value {
    json!({ "code": 0, "data": data, "msg": "成功" })
}

pub fn error_envelope(msg: &str) -> Value {
    json!({ "code": 7, "data": {}, "msg": msg })
}

pub fn refreshed(access_token: &str) -> Value {
    ok_envelope(json!({ "accessToken": access_token, "expireAt": now() + 3600 }))
}

pub fn fresh_credential(access_token: &str, refresh_token: &str) -> Credential {
    Credential::new(access_token, refresh_token).expiring_at(now() + 3600)
}

/// Expires inside the default five minute refresh window.
pub fn stale_credential(access_token: &str, refresh_token: &str) -> Credential {
    Credential::new(access_token, refresh_token).expiring_at(now() + 60)
}

pub struct Harness {
    pub client: ApiClient,
    pub store: Arc<MemoryCredentialStore>,
    pub redirects: Arc<AtomicUsize>,
}

impl Harness {
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

pub fn harness(server_uri: &str, credential: Credential) -> Harness {
    harness_with(Config::new(server_uri), credential)
}

pub fn harness_with(config: Config, credential: Credential) -> Harness {
    let store = Arc::new(MemoryCredentialStore::new(credential));
    let redirects = Arc::new(AtomicUsize::new(0));
    let counter = redirects.clone();
    let client = ApiClient::with_navigator(
        config,
        store.clone(),
        Arc::new(move |target: &str| {
            assert_eq!(target, "/login");
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .expect("client builds");
    Harness {
        client,
        store,
        redirects,
    }
}

pub fn authorization(req: &wiremock::Request) -> Option<String> {
    req.headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
