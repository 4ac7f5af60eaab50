//! Checkpoint naming, listing, and bounded retention.

mod manager;
mod naming;
mod retention;

pub use manager::{CheckpointManager, CheckpointManagerConfig};
pub use naming::{unix_millis, NamingScheme, StampSource};
pub use retention::{latest, select_for_removal, KeepCount};
