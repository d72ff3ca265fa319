//! Authenticated HTTP client for the ccops fleet-management API.
//!
//! Every call goes through one pipeline: renew the access token when it is
//! about to expire (one refresh at a time, shared by all waiting callers),
//! attach the bearer token, unwrap the `{code, data, msg}` envelope, and
//! retry once after a 401 before logging the session out.

mod client;
pub mod config;
pub mod errors;
pub mod navigation;
pub mod path;
pub mod request;
mod request_context;
pub mod telemetry;
pub mod token;
pub mod types;

pub use client::ApiClient;
pub use config::{Config, ConfigLocation};
pub use errors::Error;
pub use request::{Body, FormData, Reply, RequestOptions, ResponseType};

#[cfg(test)]
mod tests;
