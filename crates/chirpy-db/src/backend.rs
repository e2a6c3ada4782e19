use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{DbError, Result};
use crate::snapshot::Snapshot;

/// Owns the backing JSON file.
///
/// Writes go to a sibling temp file which is fsynced and renamed over the
/// original, so a concurrent reader sees either the old or the new document.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Open the backing file, creating it with an empty snapshot if absent.
    pub fn open(path: &Path) -> Result<Self> {
        let backend = Self {
            path: path.to_path_buf(),
        };

        if !path.exists() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            backend.store(&Snapshot::default())?;
            info!("Initialized empty store at {}", path.display());
        }

        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Snapshot> {
        let bytes = fs::read(&self.path)?;
        Snapshot::decode(&bytes)
    }

    pub fn store(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = snapshot.encode()?;

        // Never put a document on disk that we could not load again.
        if Snapshot::decode(&bytes)? != *snapshot {
            return Err(DbError::StoreUnavailable(
                "encoded snapshot does not read back identically".into(),
            ));
        }

        let tmp_path = self.tmp_path();
        {
            let mut file = open_private(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Delete a backing file. A file that is already gone is not an error.
pub fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed store at {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Store at {} already gone", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
