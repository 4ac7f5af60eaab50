//! Blob storage for checkpoint payloads.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Key-value blob store addressed by checkpoint id.
///
/// Payloads are opaque bytes. Implementations must treat deleting a missing
/// id as a no-op and listing an absent namespace as empty.
pub trait BlobStore {
    fn put(&self, id: &str, bytes: &[u8]) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<Vec<u8>, StoreError>;

    /// Returns `false` when the id was already gone.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Ids starting with `prefix`, in no particular order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Rejects ids that could escape a flat namespace.
pub(crate) fn validate_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0'])
    {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}
