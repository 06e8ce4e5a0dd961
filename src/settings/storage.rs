//! Key-value blob persistence for the settings store.
//!
//! Two backends:
//!
//! 1. **File** (default): one `<name>.json` per blob inside a directory,
//!    written atomically (temp file in the same directory, then rename).
//! 2. **Memory**: process-local map, used by tests and ephemeral runs.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Result, SpError};

/// Opaque string blobs addressed by a fixed name.
pub trait BlobStore: Send {
    fn load(&self, name: &str) -> Result<Option<String>>;
    fn save(&self, name: &str, blob: &str) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// Directory-backed blob store.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `name`.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        let blob = fs::read_to_string(&path)
            .map_err(|e| SpError::Storage(format!("read {}: {e}", path.display())))?;
        debug!(path = %path.display(), bytes = blob.len(), "Loaded blob");
        Ok(Some(blob))
    }

    fn save(&self, name: &str, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| SpError::Storage(format!("create {}: {e}", self.dir.display())))?;

        let path = self.path_for(name);
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| SpError::Storage(format!("temp file in {}: {e}", self.dir.display())))?;
        temp.write_all(blob.as_bytes())
            .map_err(|e| SpError::Storage(format!("write {}: {e}", path.display())))?;

        // The blob carries the API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))
                .map_err(|e| SpError::Storage(format!("set permissions: {e}")))?;
        }

        temp.persist(&path)
            .map_err(|e| SpError::Storage(format!("persist {}: {e}", path.display())))?;
        debug!(path = %path.display(), bytes = blob.len(), "Saved blob");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| SpError::Storage(format!("remove {}: {e}", path.display())))?;
        }
        Ok(())
    }
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a blob.
    #[must_use]
    pub fn with_blob(self, name: &str, blob: &str) -> Self {
        self.blobs.lock().insert(name.to_string(), blob.to_string());
        self
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, name: &str) -> Result<Option<String>> {
        Ok(self.blobs.lock().get(name).cloned())
    }

    fn save(&self, name: &str, blob: &str) -> Result<()> {
        self.blobs.lock().insert(name.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.blobs.lock().remove(name);
        Ok(())
    }
}
