use ccops_client::errors::Error;

#[test]
fn business_error_shows_server_message() {
    let err = Error::Business {
        code: 7,
        message: "主机不存在".into(),
    };
    assert_eq!(err.to_string(), "主机不存在 (code 7)");
    assert!(!err.is_auth_failure());
}

#[test]
fn download_error_is_the_raw_message() {
    assert_eq!(Error::Download("file not found".into()).to_string(), "file not found");
}

#[test]
fn auth_failures() {
    assert!(Error::StaleRefreshToken.is_auth_failure());
    assert!(Error::RefreshFailed("x".into()).is_auth_failure());
    assert!(Error::AuthRejected("x".into()).is_auth_failure());
    assert_eq!(
        Error::RefreshFailed("refresh token invalid (status 401)".into()).to_string(),
        "token refresh failed: refresh token invalid (status 401)"
    );
}

#[test]
fn json_error_keeps_its_source() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = Error::from(parse);
    assert!(std::error::Error::source(&err).is_some());
}
