//! # ckpt_keeper
//!
//! Bounded retention for periodic training checkpoints. Checkpoints are
//! opaque blobs stored under ids of the form `prefix + zero-padded stamp +
//! suffix`, so lexical order is creation order and "keep the newest N" is a
//! slice of a sorted listing.
//!
//! ## Modules
//!
//! - [`checkpoint`]: Naming scheme, retention policy, checkpoint manager
//! - [`store`]: Blob store trait with filesystem and in-memory backends
//! - [`training`]: Training loop that saves, prunes, and resumes
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types
//! - [`logging`]: Tracing subscriber setup for the binaries

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod training;
