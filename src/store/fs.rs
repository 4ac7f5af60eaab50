use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::{validate_id, BlobStore};

const TMP_SUFFIX: &str = ".tmp";

/// Stores each checkpoint as one file inside a flat directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// The directory is created lazily on the first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self.root.join(id))
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl BlobStore for FsStore {
    fn put(&self, id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let final_path = self.path_for(id)?;
        let tmp_path = self.root.join(format!("{id}{TMP_SUFFIX}"));

        fs::create_dir_all(&self.root).map_err(io_err(&self.root))?;
        fs::write(&tmp_path, bytes).map_err(io_err(&tmp_path))?;

        // Atomic rename
        if let Err(source) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io {
                path: final_path,
                source,
            });
        }
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id.to_string())),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err(&self.root))?;
            let file_type = entry.file_type().map_err(io_err(&self.root))?;
            if !file_type.is_file() {
                continue;
            }
            // Non-UTF-8 names cannot be checkpoint ids.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(prefix) && !name.ends_with(TMP_SUFFIX) {
                ids.push(name);
            }
        }
        Ok(ids)
    }
}
