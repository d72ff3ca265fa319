use std::time::Duration;

use ccops_client::errors::Error;
use ccops_client::token::{Credential, RefreshPolicy};

const NOW: i64 = 1_700_000_000;

#[test]
fn default_window_is_five_minutes() {
    assert_eq!(RefreshPolicy::default().ahead, Duration::from_secs(300));
}

#[test]
fn policy_rejects_zero_window() {
    let err = RefreshPolicy::new(Duration::ZERO).expect_err("zero window");
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn stale_inside_window_fresh_at_boundary() {
    let policy = RefreshPolicy::default();
    let at = |expires_at| Credential::new("a", "r").expiring_at(expires_at);

    assert!(policy.is_stale(&at(NOW - 1), NOW));
    assert!(policy.is_stale(&at(NOW + 299), NOW));
    assert!(!policy.is_stale(&at(NOW + 300), NOW));
    assert!(!policy.is_stale(&at(NOW + 3600), NOW));
}

#[test]
fn missing_access_token_is_stale() {
    let policy = RefreshPolicy::default();
    let credential = Credential {
        access_token: None,
        refresh_token: Some("r".into()),
        expires_at: Some(NOW + 3600),
    };
    assert!(policy.is_stale(&credential, NOW));
    assert!(policy.is_stale(&Credential::default(), NOW));
}

#[test]
fn unknown_expiry_is_stale() {
    let policy = RefreshPolicy::default();
    assert!(policy.is_stale(&Credential::new("a", "r"), NOW));
}

#[test]
fn custom_window() {
    let policy = RefreshPolicy::new(Duration::from_secs(30)).unwrap();
    let credential = Credential::new("a", "r").expiring_at(NOW + 60);
    assert!(!policy.is_stale(&credential, NOW));
    assert!(policy.is_stale(&credential, NOW + 31));
}
