use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::training::context::TrainingContext;

/// A model the trainer can step and checkpoint.
///
/// The trainer never looks inside the state JSON; the model owns its format.
pub trait Trainable {
    /// Model name recorded in snapshots.
    fn name(&self) -> &str;
    /// Run one epoch and return its loss.
    fn train_step(&mut self, ctx: &TrainingContext) -> f32;
    /// Serialize parameters and optimizer state.
    fn training_state_json(&self) -> Result<String, TrainingError>;
    /// Restore parameters and optimizer state written by `training_state_json`.
    fn restore_training_state_json(&mut self, json: &str) -> Result<(), TrainingError>;
}

/// Hyperparameters for [`LinearRegressor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    pub learning_rate: f32,
    pub momentum: f32,
    pub samples: usize,
    pub seed: u64,
    pub true_weight: f32,
    pub true_bias: f32,
    pub noise: f32,
}

impl Default for LinearConfig {
    fn default() -> Self {
        LinearConfig {
            learning_rate: 0.05,
            momentum: 0.9,
            samples: 64,
            seed: 42,
            true_weight: 2.0,
            true_bias: 1.0,
            noise: 0.05,
        }
    }
}

/// Parameters and optimizer state written to checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrainingState {
    pub weight: f32,
    pub bias: f32,
    pub velocity_weight: f32,
    pub velocity_bias: f32,
    pub step_count: usize,
    pub learning_rate: f32,
    pub momentum: f32,
}

/// Fits `y = w*x + b` with full-batch SGD and momentum on a synthetic dataset.
pub struct LinearRegressor {
    config: LinearConfig,
    xs: Vec<f32>,
    ys: Vec<f32>,
    weight: f32,
    bias: f32,
    velocity_weight: f32,
    velocity_bias: f32,
    step_count: usize,
}

impl LinearRegressor {
    pub fn new(config: LinearConfig) -> Self {
        // The dataset is regenerated from the seed, so it never goes into checkpoints.
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut xs = Vec::with_capacity(config.samples);
        let mut ys = Vec::with_capacity(config.samples);
        for _ in 0..config.samples {
            let x: f32 = rng.random_range(-1.0..1.0);
            let noise = if config.noise > 0.0 {
                rng.random_range(-config.noise..config.noise)
            } else {
                0.0
            };
            xs.push(x);
            ys.push(config.true_weight * x + config.true_bias + noise);
        }
        LinearRegressor {
            config,
            xs,
            ys,
            weight: 0.0,
            bias: 0.0,
            velocity_weight: 0.0,
            velocity_bias: 0.0,
            step_count: 0,
        }
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn training_state(&self) -> LinearTrainingState {
        LinearTrainingState {
            weight: self.weight,
            bias: self.bias,
            velocity_weight: self.velocity_weight,
            velocity_bias: self.velocity_bias,
            step_count: self.step_count,
            learning_rate: self.config.learning_rate,
            momentum: self.config.momentum,
        }
    }

    /// Restore parameters and optimizer velocity.
    ///
    /// `learning_rate` and `momentum` stay as configured, so overrides given
    /// for a resumed run take effect. The saved values are informational.
    pub fn restore_training_state(&mut self, state: &LinearTrainingState) {
        self.weight = state.weight;
        self.bias = state.bias;
        self.velocity_weight = state.velocity_weight;
        self.velocity_bias = state.velocity_bias;
        self.step_count = state.step_count;
    }

    /// Mean squared error and its gradient with respect to (weight, bias).
    fn loss_and_grad(&self) -> (f32, f32, f32) {
        let n = self.xs.len();
        if n == 0 {
            return (0.0, 0.0, 0.0);
        }
        let mut loss = 0.0;
        let mut grad_w = 0.0;
        let mut grad_b = 0.0;
        for (&x, &y) in self.xs.iter().zip(&self.ys) {
            let err = self.weight * x + self.bias - y;
            loss += err * err;
            grad_w += 2.0 * err * x;
            grad_b += 2.0 * err;
        }
        let n = n as f32;
        (loss / n, grad_w / n, grad_b / n)
    }
}

impl Trainable for LinearRegressor {
    fn name(&self) -> &str {
        "linear"
    }

    fn train_step(&mut self, _ctx: &TrainingContext) -> f32 {
        let (loss, grad_w, grad_b) = self.loss_and_grad();
        let lr = self.config.learning_rate;
        let momentum = self.config.momentum;
        self.velocity_weight = momentum * self.velocity_weight - lr * grad_w;
        self.velocity_bias = momentum * self.velocity_bias - lr * grad_b;
        self.weight += self.velocity_weight;
        self.bias += self.velocity_bias;
        self.step_count += 1;
        loss
    }

    fn training_state_json(&self) -> Result<String, TrainingError> {
        Ok(serde_json::to_string(&self.training_state())?)
    }

    fn restore_training_state_json(&mut self, json: &str) -> Result<(), TrainingError> {
        let state: LinearTrainingState = serde_json::from_str(json)
            .map_err(|e| TrainingError::StateRejected(e.to_string()))?;
        self.restore_training_state(&state);
        Ok(())
    }
}
