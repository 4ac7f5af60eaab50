//! Training-loop collaborator: explicit context, save cadence, a small
//! demonstration model, and a trainer that checkpoints and prunes.

pub mod context;
pub mod metrics;
pub mod model;
pub mod snapshot;
pub mod trainer;

pub use context::{SavePolicy, TrainingContext};
pub use model::{LinearConfig, LinearRegressor, Trainable};
pub use snapshot::TrainingSnapshot;
pub use trainer::{ResumePoint, Trainer, TrainerConfig, TrainingSummary};
