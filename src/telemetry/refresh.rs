use jiff::Timestamp;
use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

#[derive(Clone, Copy, Debug)]
pub enum RefreshTrigger {
    /// Stored expiry fell inside the refresh window.
    Stale,
    /// The server answered 401 to a request carrying the current token.
    Rejected,
}

/// Structured events for one refresh attempt, tied together by `attempt_id`.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    trigger: RefreshTrigger,
}

impl RefreshTelemetry {
    pub fn new(trigger: RefreshTrigger) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            trigger,
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger
    }

    pub fn emit_start(&self) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            trigger = ?self.trigger,
            timestamp = %Timestamp::now(),
            "refresh.start"
        );
    }

    pub fn emit_join(trigger: RefreshTrigger) {
        event!(Level::DEBUG, trigger = ?trigger, "refresh.join");
    }

    pub fn emit_success(&self, expires_at: Option<i64>) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            trigger = ?self.trigger,
            timestamp = %Timestamp::now(),
            expires_at = ?expires_at,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, error: &Error) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            trigger = ?self.trigger,
            timestamp = %Timestamp::now(),
            error = %error,
            "refresh.failure"
        );
    }
}
