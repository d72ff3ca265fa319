use std::sync::Arc;

use crate::request_context::RequestDispatchContext;

mod auth;
mod impls;

pub(crate) use auth::refresh_access_token;

/// Authenticated client for the ccops API.
///
/// Cheap to clone; clones share one credential store and one refresh guard.
#[derive(Clone)]
pub struct ApiClient {
    ctx: Arc<RequestDispatchContext>,
}
