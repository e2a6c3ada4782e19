//! Single-file JSON document store for chirpy.
//!
//! Every operation loads the document, works on it and (for mutations)
//! writes it back while holding one lock acquisition, so check-then-write
//! logic can never interleave with another writer.

pub mod backend;
pub mod chirps;
pub mod error;
pub mod models;
pub mod password;
pub mod refresh_tokens;
pub mod snapshot;
pub mod users;

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::backend::FileBackend;
pub use crate::chirps::SortOrder;
pub use crate::error::{DbError, Result};
use crate::snapshot::Snapshot;

pub struct Database {
    backend: RwLock<FileBackend>,
}

impl Database {
    /// Open (or create) the store. A document that fails to decode is fatal here.
    pub fn open(path: &Path) -> Result<Self> {
        let backend = FileBackend::open(path)?;
        let snapshot = backend.load()?;

        info!(
            "Store opened at {} ({} users, {} chirps, {} refresh tokens)",
            path.display(),
            snapshot.users.len(),
            snapshot.chirps.len(),
            snapshot.refresh_tokens.len()
        );
        Ok(Self {
            backend: RwLock::new(backend),
        })
    }

    /// Run `f` against the current snapshot under a shared lock.
    pub fn with_snapshot<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Snapshot) -> T,
    {
        let backend = self.read_lock();
        let snapshot = load_retrying(&backend)?;
        Ok(f(&snapshot))
    }

    /// Run `f` against the current snapshot under the exclusive lock and
    /// persist the result. Nothing is written if `f` returns an error.
    pub fn with_snapshot_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let backend = self.write_lock();
        let mut snapshot = load_retrying(&backend)?;
        let out = f(&mut snapshot)?;
        backend.store(&snapshot)?;
        Ok(out)
    }

    // The guarded value is only the file handle; the document itself lives on
    // disk, so a panic in another caller leaves nothing half-updated in memory.
    fn read_lock(&self) -> RwLockReadGuard<'_, FileBackend> {
        self.backend.read().unwrap_or_else(|poisoned| {
            warn!("Store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, FileBackend> {
        self.backend.write().unwrap_or_else(|poisoned| {
            warn!("Store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// Transient I/O gets exactly one more attempt.
fn load_retrying(backend: &FileBackend) -> Result<Snapshot> {
    match backend.load() {
        Ok(snapshot) => Ok(snapshot),
        Err(DbError::StoreUnavailable(e)) => {
            warn!("Loading {} failed ({}), retrying once", backend.path().display(), e);
            backend.load()
        }
        Err(e) => Err(e),
    }
}
