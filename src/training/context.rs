use serde::{Deserialize, Serialize};

/// Where a training run currently stands. Passed explicitly into every save.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingContext {
    /// 1-based epoch that just finished.
    pub epoch: usize,
    pub total_epochs: usize,
    pub last_loss: f32,
}

impl TrainingContext {
    pub fn is_final_epoch(&self) -> bool {
        self.epoch == self.total_epochs
    }
}

/// When the training loop writes a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavePolicy {
    /// Save whenever `epoch` is a multiple of this. Zero disables periodic saves.
    pub every_n_epochs: usize,
    pub on_final_epoch: bool,
}

impl Default for SavePolicy {
    fn default() -> Self {
        SavePolicy {
            every_n_epochs: 200,
            on_final_epoch: true,
        }
    }
}

impl SavePolicy {
    pub fn should_save(&self, ctx: &TrainingContext) -> bool {
        let periodic = self.every_n_epochs > 0 && ctx.epoch % self.every_n_epochs == 0;
        periodic || (self.on_final_epoch && ctx.is_final_epoch())
    }
}
