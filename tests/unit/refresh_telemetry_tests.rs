use ccops_client::telemetry::refresh::{RefreshTelemetry, RefreshTrigger};

#[test]
fn each_attempt_gets_its_own_id() {
    let first = RefreshTelemetry::new(RefreshTrigger::Stale);
    let second = RefreshTelemetry::new(RefreshTrigger::Rejected);
    assert_ne!(first.attempt_id(), second.attempt_id());
    assert!(matches!(second.trigger(), RefreshTrigger::Rejected));
}
