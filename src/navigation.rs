use std::sync::Arc;

use tracing::warn;

/// Where the client sends the user once the session cannot be recovered.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self, target: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect_to_login(&self, target: &str) {
        self(target)
    }
}

/// Default navigator for headless use: records the redirect in the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self, target: &str) {
        warn!(target_path = %target, "auth.redirect_to_login");
    }
}

#[derive(Clone)]
pub struct LoginRedirect {
    navigator: Arc<dyn Navigator>,
    target: String,
}

impl LoginRedirect {
    pub fn new(navigator: Arc<dyn Navigator>, target: impl Into<String>) -> Self {
        Self {
            navigator,
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn fire(&self) {
        self.navigator.redirect_to_login(&self.target);
    }
}

impl Default for LoginRedirect {
    fn default() -> Self {
        Self::new(Arc::new(LogNavigator), "/login")
    }
}
