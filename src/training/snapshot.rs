use serde::{Deserialize, Serialize};

use crate::error::{CheckpointError, TrainingError};

/// Payload the trainer writes into each checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSnapshot {
    pub epoch: usize,
    pub timestamp: u64,
    pub model: String,
    pub loss: f32,
    /// Model-owned state, opaque to the trainer.
    pub training_state_json: String,
}

impl TrainingSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, TrainingError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn decode(id: &str, bytes: &[u8]) -> Result<Self, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Unreadable {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}
