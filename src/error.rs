use std::path::PathBuf;

/// Errors raised by a blob store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid checkpoint id '{0}'")]
    InvalidId(String),

    #[error("checkpoint '{0}' not found")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("unreadable checkpoint '{id}': {reason}")]
    Unreadable { id: String, reason: String },

    #[error("stamp {stamp} needs more than {width} digits")]
    StampOverflow { stamp: u64, width: usize },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("failed to encode training state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("training state rejected: {0}")]
    StateRejected(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("invalid configuration: keep count must be >= 0, got {0}")]
    InvalidKeepCount(i64),

    #[error("invalid configuration: pattern '{0}' must contain exactly one '*'")]
    InvalidPattern(String),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_display() {
        let err = CheckpointError::Unreadable {
            id: "check_00000200.ckpt".to_string(),
            reason: "EOF while parsing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unreadable checkpoint 'check_00000200.ckpt': EOF while parsing"
        );
    }

    #[test]
    fn test_invalid_keep_count_display() {
        let err = ConfigError::InvalidKeepCount(-1);
        assert_eq!(
            err.to_string(),
            "invalid configuration: keep count must be >= 0, got -1"
        );
    }

    #[test]
    fn test_store_error_converts_into_checkpoint_error() {
        let err: CheckpointError = StoreError::InvalidId("../x".into()).into();
        assert!(matches!(err, CheckpointError::Store(StoreError::InvalidId(_))));
        assert_eq!(err.to_string(), "storage error: invalid checkpoint id '../x'");
    }
}
