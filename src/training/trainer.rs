use tracing::info;

use crate::checkpoint::{unix_millis, CheckpointManager};
use crate::error::{CheckpointError, TrainingError};
use crate::store::BlobStore;
use crate::training::context::{SavePolicy, TrainingContext};
use crate::training::metrics::TrainingMetrics;
use crate::training::model::Trainable;
use crate::training::snapshot::TrainingSnapshot;

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_epochs: usize,
    pub log_interval: usize,
    #[serde(flatten)]
    pub save_policy: SavePolicy,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_epochs: 1000,
            log_interval: 100,
            save_policy: SavePolicy::default(),
        }
    }
}

/// What a call to [`Trainer::train`] did.
#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    pub epochs_run: usize,
    pub final_loss: Option<f32>,
    pub checkpoints_saved: Vec<String>,
    pub checkpoints_pruned: Vec<String>,
}

/// A resumed run: where it left off and which checkpoint it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumePoint {
    pub checkpoint_id: String,
    pub context: TrainingContext,
}

impl ResumePoint {
    pub fn next_epoch(&self) -> usize {
        self.context.epoch + 1
    }
}

/// Sequential training loop that checkpoints and prunes as it goes.
pub struct Trainer<S> {
    config: TrainerConfig,
    checkpoint_manager: CheckpointManager<S>,
}

impl<S: BlobStore> Trainer<S> {
    pub fn new(config: TrainerConfig, checkpoint_manager: CheckpointManager<S>) -> Self {
        Trainer {
            config,
            checkpoint_manager,
        }
    }

    pub fn checkpoint_manager(&self) -> &CheckpointManager<S> {
        &self.checkpoint_manager
    }

    /// Restore `model` from the newest checkpoint.
    ///
    /// Returns `None` when there is nothing to resume from. A checkpoint that
    /// cannot be decoded is an error; older checkpoints are not tried.
    pub fn resume(&self, model: &mut dyn Trainable) -> Result<Option<ResumePoint>, TrainingError> {
        let Some((id, payload)) = self.checkpoint_manager.load_latest()? else {
            info!("no checkpoint found, starting fresh");
            return Ok(None);
        };
        let snapshot = TrainingSnapshot::decode(&id, &payload)?;
        model
            .restore_training_state_json(&snapshot.training_state_json)
            .map_err(|e| CheckpointError::Unreadable {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        info!(id = %id, epoch = snapshot.epoch, "resumed from checkpoint");
        Ok(Some(ResumePoint {
            checkpoint_id: id,
            context: TrainingContext {
                epoch: snapshot.epoch,
                total_epochs: self.config.num_epochs,
                last_loss: snapshot.loss,
            },
        }))
    }

    /// Train from `start_epoch` through `num_epochs` (inclusive, 1-based).
    pub fn train(
        &self,
        model: &mut dyn Trainable,
        start_epoch: usize,
    ) -> Result<TrainingSummary, TrainingError> {
        let mut metrics = TrainingMetrics::new();
        let mut summary = TrainingSummary::default();
        let start_epoch = start_epoch.max(1);
        let end_epoch = self.config.num_epochs;

        if start_epoch > end_epoch {
            info!(start_epoch, end_epoch, "nothing left to train");
            return Ok(summary);
        }

        info!(
            model = model.name(),
            start_epoch,
            end_epoch,
            keep = %self.checkpoint_manager.keep(),
            "starting training"
        );

        for epoch in start_epoch..=end_epoch {
            let mut ctx = TrainingContext {
                epoch,
                total_epochs: end_epoch,
                last_loss: metrics.last_loss().unwrap_or(0.0),
            };
            ctx.last_loss = model.train_step(&ctx);
            metrics.record_epoch(ctx.last_loss);
            summary.epochs_run += 1;

            if self.config.log_interval > 0 && epoch % self.config.log_interval == 0 {
                info!(
                    epoch,
                    loss = ctx.last_loss,
                    avg_loss = metrics.average_loss(self.config.log_interval),
                    "epoch complete"
                );
            }

            if self.config.save_policy.should_save(&ctx) {
                let id = self.save_checkpoint(model, &ctx)?;
                summary.checkpoints_saved.push(id);
                let pruned = self.checkpoint_manager.enforce_retention()?;
                summary.checkpoints_pruned.extend(pruned);
            }
        }

        summary.final_loss = metrics.last_loss();
        info!(
            epochs = summary.epochs_run,
            saved = summary.checkpoints_saved.len(),
            pruned = summary.checkpoints_pruned.len(),
            "training complete"
        );
        Ok(summary)
    }

    /// Serialize the model with `ctx` and hand it to the checkpoint manager.
    pub fn save_checkpoint(
        &self,
        model: &dyn Trainable,
        ctx: &TrainingContext,
    ) -> Result<String, TrainingError> {
        let snapshot = TrainingSnapshot {
            epoch: ctx.epoch,
            timestamp: unix_millis() / 1000,
            model: model.name().to_string(),
            loss: ctx.last_loss,
            training_state_json: model.training_state_json()?,
        };
        let id = self
            .checkpoint_manager
            .save(ctx.epoch as u64, &snapshot.encode()?)?;
        Ok(id)
    }
}
