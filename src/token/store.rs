use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{error, info};

use crate::errors::Error;

use super::{Credential, CredentialPatch};

/// Single source of truth for the session's tokens.
///
/// Reads must always observe the latest write; callers never cache a token
/// across an await point.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Credential;
    fn set(&self, patch: CredentialPatch);
    /// Drops the session. Returns false when there was nothing to drop, so
    /// concurrent logouts can tell which of them ended the session.
    fn clear(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: RwLock<Credential>,
}

impl MemoryCredentialStore {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(credential),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Credential {
        self.credential
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, patch: CredentialPatch) {
        self.credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .apply(patch);
    }

    fn clear(&self) -> bool {
        let mut credential = self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        !std::mem::take(&mut *credential).is_empty()
    }
}

/// Store backed by a JSON file so a session survives restarts.
///
/// The file is written on every change and removed on `clear`. Write
/// failures are logged; the in-memory copy stays authoritative.
///
/// File I/O is blocking and happens under the write lock so writes land on
/// disk in the order they were made. The file is a few hundred bytes.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    credential: RwLock<Credential>,
}

impl FileCredentialStore {
    /// Opens the store, loading any credential already on disk.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let credential = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Credential::default(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Credential::default(),
            Err(err) => return Err(Error::Io(err)),
        };
        info!(
            "credential store opened: path='{}' authenticated={}",
            path.display(),
            credential.is_authenticated()
        );
        Ok(Self {
            path,
            credential: RwLock::new(credential),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, credential: &Credential) {
        let result = serde_json::to_string_pretty(credential)
            .map_err(Error::from)
            .and_then(|json| std::fs::write(&self.path, json).map_err(Error::from));
        if let Err(err) = result {
            error!(
                "credential store write failed: path='{}' error={}",
                self.path.display(),
                err
            );
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Credential {
        self.credential
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, patch: CredentialPatch) {
        let mut credential = self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        credential.apply(patch);
        self.persist(&credential);
    }

    fn clear(&self) -> bool {
        let mut credential = self
            .credential
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let had_session = !std::mem::take(&mut *credential).is_empty();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                // A file left behind would restore the session on the next open.
                error!(
                    "credential store remove failed, overwriting instead: path='{}' error={}",
                    self.path.display(),
                    err
                );
                self.persist(&credential);
            }
        }
        had_session
    }
}
