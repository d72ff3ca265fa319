use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracing::subscriber::{DefaultGuard, set_default};
use tracing_subscriber::{Registry, fmt, layer::SubscriberExt};

use crate::token::{Credential, CredentialStore, MemoryCredentialStore};
use crate::{ApiClient, Config};

pub fn now() -> i64 {
    jiff::Timestamp::now().as_second()
}

pub fn ok_envelope(data: Value) -> Value {
    json!({ "code": 0, "data": data, "msg": "成功" })
}

pub fn refreshed(access_token: &str) -> Value {
    ok_envelope(json!({ "accessToken": access_token, "expireAt": now() + 3600 }))
}

pub fn fresh_credential(access_token: &str, refresh_token: &str) -> Credential {
    Credential::new(access_token, refresh_token).expiring_at(now() + 3600)
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

    pub fn store_is_cleared(&self) -> bool {
        self.store.get().is_empty()
    }
}

pub fn harness(server_uri: &str, credential: Credential) -> Harness {
    let store = Arc::new(MemoryCredentialStore::new(credential));
    let redirects = Arc::new(AtomicUsize::new(0));
    let counter = redirects.clone();
    let client = ApiClient::with_navigator(
        Config::new(server_uri),
        store.clone(),
        Arc::new(move |_: &str| {
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

struct VecWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl std::io::Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.lines.lock().unwrap();
        guard.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn make_subscriber(lines: Arc<Mutex<Vec<String>>>) -> impl tracing::Subscriber + Send + Sync {
    let writer_lines = lines.clone();
    Registry::default().with(
        fmt::Layer::default()
            .with_writer(move || VecWriter {
                lines: writer_lines.clone(),
            })
            .with_target(false)
            .with_level(true)
            .with_ansi(false),
    )
}

pub fn capture_logs() -> (Arc<Mutex<Vec<String>>>, DefaultGuard) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let guard = set_default(make_subscriber(lines.clone()));
    (lines, guard)
}

pub fn drain_logs(lines: Arc<Mutex<Vec<String>>>) -> Vec<String> {
    lines.lock().unwrap().clone()
}
