//! Server-relative API paths.

pub const AUTH_LOGIN: &str = "/api/auth/login";
pub const AUTH_REFRESH: &str = "/api/auth/refresh";

/// Substitutes `:name` segments of a path template, percent-encoding each value.
///
/// Segments without a matching parameter are left untouched.
pub fn bind(template: &str, params: &[(&str, &str)]) -> String {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| urlencoding::encode(value).into_owned())
                .unwrap_or_else(|| segment.to_string()),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Strips any query string so allow-list checks compare the bare path.
pub(crate) fn without_query(path: &str) -> &str {
    path.split_once('?').map(|(bare, _)| bare).unwrap_or(path)
}
