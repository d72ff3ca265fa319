mod credential;
mod guard;
mod policy;
mod store;

pub use credential::{Credential, CredentialPatch};
pub use guard::{
    RefreshFailure, RefreshFn, RenewedToken, TokenGuard, TokenGuardConfig, TokenGuardResult,
};
pub use policy::RefreshPolicy;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
