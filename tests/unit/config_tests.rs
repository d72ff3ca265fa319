use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ccops_client::errors::Error;
use ccops_client::token::MemoryCredentialStore;
use ccops_client::{ApiClient, Config, ConfigLocation};

fn write_config(name: &str, body: serde_json::Value) -> PathBuf {
    let mut cfg_path = PathBuf::from("target");
    cfg_path.push(format!("test-config-{}.json", name));
    fs::create_dir_all("target").ok();
    fs::write(&cfg_path, serde_json::to_string(&body).unwrap()).unwrap();
    cfg_path
}

#[test]
fn file_config_fills_defaults() {
    let cfg_path = write_config(
        "defaults",
        serde_json::json!({ "base_url": "https://ops.example.com" }),
    );
    let config = Config::load(ConfigLocation::File(cfg_path.to_string_lossy().to_string()))
        .expect("config loads");

    assert_eq!(config.base_url, "https://ops.example.com");
    assert_eq!(config.login_path, "/api/auth/login");
    assert_eq!(config.refresh_path, "/api/auth/refresh");
    assert_eq!(config.login_redirect, "/login");
    assert_eq!(config.refresh_ahead(), Duration::from_secs(300));
    assert_eq!(config.request_timeout(), None);
    assert!(!config.send_refresh_token_header);
    assert!(config.credential_path.is_none());
}

#[test]
fn file_config_overrides() {
    let cfg_path = write_config(
        "overrides",
        serde_json::json!({
            "base_url": "ops.example.com",
            "refresh_path": "/api/v2/auth/refresh",
            "refresh_ahead_secs": 60,
            "request_timeout_secs": 15,
            "send_refresh_token_header": true
        }),
    );
    let config = Config::from_file(&cfg_path).unwrap();
    assert_eq!(config.refresh_path, "/api/v2/auth/refresh");
    assert_eq!(config.refresh_ahead(), Duration::from_secs(60));
    assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    assert!(config.send_refresh_token_header);
}

#[test]
fn missing_file_is_io_error() {
    let err = Config::from_file("target/does-not-exist.json").expect_err("missing");
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn client_rejects_unusable_config() {
    let store = Arc::new(MemoryCredentialStore::default());

    let err = ApiClient::new(Config::new("http://bad host:99999"), store.clone())
        .err()
        .expect("invalid url");
    assert!(matches!(err, Error::Config(_)), "{:?}", err);

    let mut config = Config::new("http://127.0.0.1:8080");
    config.refresh_ahead_secs = 0;
    let err = ApiClient::new(config, store).err().expect("zero window");
    assert!(matches!(err, Error::Config(_)));
}
