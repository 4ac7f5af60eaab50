use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::checkpoint::naming::{unix_millis, NamingScheme, StampSource};
use crate::checkpoint::retention::{self, KeepCount};
use crate::error::{CheckpointError, ConfigError};
use crate::store::{BlobStore, FsStore};

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
    pub pattern: String,
    pub stamp: StampSource,
    /// Zero-padding width of the stamp; defaults per stamp source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_width: Option<usize>,
    pub keep_last_n: KeepCount,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            pattern: "check_*.ckpt".to_string(),
            stamp: StampSource::Epoch,
            stamp_width: None,
            keep_last_n: KeepCount::default(),
        }
    }
}

impl CheckpointManagerConfig {
    pub fn naming(&self) -> Result<NamingScheme, ConfigError> {
        let width = self
            .stamp_width
            .unwrap_or_else(|| self.stamp.default_width());
        NamingScheme::from_pattern(&self.pattern, width)
    }
}

/// Saves, lists, and prunes checkpoints in a blob store.
///
/// The retention set is never cached: every listing goes back to the store,
/// so repeated pruning converges on the newest `keep` ids even if another
/// writer slipped a checkpoint in between calls.
pub struct CheckpointManager<S> {
    store: S,
    naming: NamingScheme,
    stamp: StampSource,
    keep: KeepCount,
}

impl CheckpointManager<FsStore> {
    /// Build a filesystem-backed manager from configuration.
    pub fn from_config(config: &CheckpointManagerConfig) -> Result<Self, ConfigError> {
        let naming = config.naming()?;
        Ok(CheckpointManager::new(
            FsStore::new(&config.checkpoint_dir),
            naming,
            config.keep_last_n,
        )
        .with_stamp_source(config.stamp))
    }
}

impl<S: BlobStore> CheckpointManager<S> {
    pub fn new(store: S, naming: NamingScheme, keep: KeepCount) -> Self {
        CheckpointManager {
            store,
            naming,
            stamp: StampSource::Epoch,
            keep,
        }
    }

    pub fn with_stamp_source(mut self, stamp: StampSource) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn naming(&self) -> &NamingScheme {
        &self.naming
    }

    pub fn keep(&self) -> KeepCount {
        self.keep
    }

    /// All ids matching `naming`, sorted ascending. Empty storage is not an error.
    ///
    /// Ids whose stamp is not `naming.width()` digits are still listed, but
    /// their lexical position may not match their age.
    pub fn list_checkpoints(&self, naming: &NamingScheme) -> Result<Vec<String>, CheckpointError> {
        let mut ids: Vec<String> = self
            .store
            .list(naming.prefix())?
            .into_iter()
            .filter(|id| naming.matches(id))
            .collect();
        ids.sort();
        for id in ids.iter().filter(|id| !naming.has_canonical_stamp(id)) {
            warn!(
                id = %id,
                width = naming.width(),
                "checkpoint stamp is not zero-padded to the scheme width; ordering may be wrong"
            );
        }
        Ok(ids)
    }

    /// Ids under this manager's own naming scheme.
    pub fn list(&self) -> Result<Vec<String>, CheckpointError> {
        self.list_checkpoints(&self.naming)
    }

    /// Delete every id in the ascending list except the newest `keep`.
    ///
    /// Returns the ids selected for removal. An id that is already gone from
    /// the store is still reported, since it is absent either way.
    pub fn prune(&self, ids: &[String], keep: KeepCount) -> Result<Vec<String>, CheckpointError> {
        let doomed = retention::select_for_removal(ids, keep);
        for id in doomed {
            if self.store.delete(id)? {
                debug!(id = %id, "deleted checkpoint");
            } else {
                warn!(id = %id, "checkpoint already gone");
            }
        }
        if !doomed.is_empty() {
            info!(
                removed = doomed.len(),
                kept = ids.len() - doomed.len(),
                "pruned checkpoints"
            );
        }
        Ok(doomed.to_vec())
    }

    /// Store `payload` under the id for `stamp` (or the current time, for
    /// wall-clock stamping) and return that id.
    pub fn save(&self, epoch: u64, payload: &[u8]) -> Result<String, CheckpointError> {
        let stamp = match self.stamp {
            StampSource::Epoch => epoch,
            StampSource::UnixMillis => unix_millis(),
        };
        let id = self.naming.id_for(stamp)?;
        self.store.put(&id, payload)?;
        info!(id = %id, bytes = payload.len(), "saved checkpoint");
        Ok(id)
    }

    /// Read back a checkpoint payload. Any read failure is fatal to the caller.
    pub fn load(&self, id: &str) -> Result<Vec<u8>, CheckpointError> {
        self.store
            .get(id)
            .map_err(|e| CheckpointError::Unreadable {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    /// The newest checkpoint and its payload, if any exist.
    pub fn load_latest(&self) -> Result<Option<(String, Vec<u8>)>, CheckpointError> {
        let ids = self.list()?;
        match retention::latest(&ids) {
            Some(id) => {
                let payload = self.load(id)?;
                Ok(Some((id.to_string(), payload)))
            }
            None => Ok(None),
        }
    }

    /// List then prune with the configured keep count.
    pub fn enforce_retention(&self) -> Result<Vec<String>, CheckpointError> {
        let ids = self.list()?;
        self.prune(&ids, self.keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn seeded(names: &[&str]) -> CheckpointManager<MemoryStore> {
        let store = MemoryStore::new();
        for name in names {
            store.put(name, name.as_bytes()).unwrap();
        }
        CheckpointManager::new(
            store,
            NamingScheme::from_pattern("check_*", 4).unwrap(),
            KeepCount::new(3),
        )
    }

    #[test]
    fn test_prune_five_keep_three() {
        let manager = seeded(&[
            "check_0001",
            "check_0002",
            "check_0003",
            "check_0004",
            "check_0005",
        ]);
        let list = manager.list().unwrap();
        let removed = manager.prune(&list, KeepCount::new(3)).unwrap();
        assert_eq!(removed, ids(&["check_0001", "check_0002"]));
        assert_eq!(
            manager.list().unwrap(),
            ids(&["check_0003", "check_0004", "check_0005"])
        );
    }

    #[test]
    fn test_prune_fewer_than_keep_deletes_nothing() {
        let manager = seeded(&["check_0001", "check_0002"]);
        let list = manager.list().unwrap();
        assert!(manager.prune(&list, KeepCount::new(3)).unwrap().is_empty());
        assert_eq!(manager.list().unwrap().len(), 2);
    }

    #[test]
    fn test_prune_empty_store() {
        let manager = seeded(&[]);
        let list = manager.list().unwrap();
        assert!(list.is_empty());
        assert!(manager.prune(&list, KeepCount::new(3)).unwrap().is_empty());
        assert_eq!(retention::latest(&list), None);
    }

    #[test]
    fn test_prune_keep_zero_deletes_everything() {
        let manager = seeded(&["check_0001", "check_0002", "check_0003"]);
        let list = manager.list().unwrap();
        let removed = manager.prune(&list, KeepCount::new(0)).unwrap();
        assert_eq!(removed, list);
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_prune_is_idempotent() {
        let manager = seeded(&["check_0001", "check_0002", "check_0003", "check_0004"]);
        assert_eq!(manager.enforce_retention().unwrap().len(), 1);
        assert!(manager.enforce_retention().unwrap().is_empty());
        assert_eq!(manager.list().unwrap().len(), 3);
    }

    #[test]
    fn test_prune_tolerates_already_deleted() {
        let manager = seeded(&["check_0001", "check_0002", "check_0003", "check_0004"]);
        let list = manager.list().unwrap();
        // Someone else removed the oldest one after we listed.
        manager.store().delete("check_0001").unwrap();

        let removed = manager.prune(&list, KeepCount::new(3)).unwrap();
        assert_eq!(removed, ids(&["check_0001"]));
        assert_eq!(manager.list().unwrap().len(), 3);
    }

    #[test]
    fn test_list_sorts_and_filters() {
        let store = MemoryStore::new();
        for name in ["check_0003.ckpt", "check_0001.ckpt", "check_0002.bak", "model_0001.ckpt"] {
            store.put(name, b"x").unwrap();
        }
        let manager = CheckpointManager::new(store, NamingScheme::default(), KeepCount::new(3));
        let scheme = NamingScheme::from_pattern("check_*.ckpt", 4).unwrap();
        assert_eq!(
            manager.list_checkpoints(&scheme).unwrap(),
            ids(&["check_0001.ckpt", "check_0003.ckpt"])
        );
    }

    #[test]
    fn test_list_keeps_off_width_ids_in_lexical_order() {
        let store = MemoryStore::new();
        for name in ["check_0999.ckpt", "check_00001000.ckpt"] {
            store.put(name, b"x").unwrap();
        }
        let manager = CheckpointManager::new(store, NamingScheme::default(), KeepCount::new(3));
        // Plain glob matching: both are listed, sorted as strings.
        assert_eq!(
            manager.list().unwrap(),
            ids(&["check_00001000.ckpt", "check_0999.ckpt"])
        );
        assert!(!manager.naming().has_canonical_stamp("check_0999.ckpt"));
        assert!(manager.naming().has_canonical_stamp("check_00001000.ckpt"));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let manager = CheckpointManager::new(
            MemoryStore::new(),
            NamingScheme::default(),
            KeepCount::new(3),
        );
        let payload = vec![0u8, 1, 2, 255, 254];
        let id = manager.save(200, &payload).unwrap();
        assert_eq!(id, "check_00000200.ckpt");
        assert_eq!(manager.load(&id).unwrap(), payload);
    }

    #[test]
    fn test_load_missing_is_unreadable() {
        let manager = seeded(&[]);
        let err = manager.load("check_0042").unwrap_err();
        assert!(matches!(err, CheckpointError::Unreadable { ref id, .. } if id == "check_0042"));
    }

    #[test]
    fn test_load_latest() {
        let manager = seeded(&[]);
        assert!(manager.load_latest().unwrap().is_none());

        manager.save(1, b"first").unwrap();
        manager.save(2, b"second").unwrap();
        let (id, payload) = manager.load_latest().unwrap().unwrap();
        assert_eq!(id, "check_0002");
        assert_eq!(payload, b"second");
    }

    #[test]
    fn test_save_rejects_stamp_overflow() {
        let manager = seeded(&[]);
        assert!(matches!(
            manager.save(12_345, b"x"),
            Err(CheckpointError::StampOverflow { .. })
        ));
    }

    #[test]
    fn test_filesystem_manager_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = CheckpointManagerConfig {
            checkpoint_dir: dir.path().join("ckpts"),
            keep_last_n: KeepCount::new(2),
            ..Default::default()
        };
        let manager = CheckpointManager::from_config(&config).unwrap();

        assert!(manager.list().unwrap().is_empty());
        for epoch in [200, 400, 600] {
            manager.save(epoch, format!("epoch {epoch}").as_bytes()).unwrap();
            manager.enforce_retention().unwrap();
        }
        assert_eq!(
            manager.list().unwrap(),
            ids(&["check_00000400.ckpt", "check_00000600.ckpt"])
        );
        assert_eq!(manager.load("check_00000600.ckpt").unwrap(), b"epoch 600");
    }

    #[test]
    fn test_unix_millis_stamp() {
        let manager = CheckpointManager::new(
            MemoryStore::new(),
            NamingScheme::new("check_", ".ckpt", 13),
            KeepCount::new(3),
        )
        .with_stamp_source(StampSource::UnixMillis);
        let id = manager.save(0, b"x").unwrap();
        assert!(manager.naming().stamp_of(&id).unwrap() > 0);
    }
}
