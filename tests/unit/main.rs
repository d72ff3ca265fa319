mod config_tests;
mod error_display;
mod refresh_policy_tests;
mod refresh_telemetry_tests;
