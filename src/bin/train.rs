use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ckpt_keeper::checkpoint::{CheckpointManager, KeepCount};
use ckpt_keeper::config::AppConfig;
use ckpt_keeper::training::{LinearRegressor, Trainer};

/// Train the demonstration model, checkpointing and pruning as it goes.
#[derive(Parser)]
#[command(name = "train", about = "Train with bounded checkpoint retention")]
struct Cli {
    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Path to TOML configuration file
    #[arg(long, default_value = "ckpt.toml")]
    config: PathBuf,

    /// Override the total number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Override how many checkpoints to keep
    #[arg(long, allow_negative_numbers = true)]
    keep: Option<i64>,

    /// Override the checkpoint directory
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Override the save interval in epochs
    #[arg(long)]
    save_every: Option<usize>,

    /// Override the learning rate
    #[arg(long)]
    lr: Option<f32>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ckpt_keeper::logging::init(cli.verbose);

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(epochs) = cli.epochs {
        app_config.training.num_epochs = epochs;
    }
    if let Some(keep) = cli.keep {
        app_config.checkpoint.keep_last_n = KeepCount::try_from(keep)?;
    }
    if let Some(dir) = cli.dir {
        app_config.checkpoint.checkpoint_dir = dir;
    }
    if let Some(every) = cli.save_every {
        app_config.training.save_policy.every_n_epochs = every;
    }
    if let Some(lr) = cli.lr {
        app_config.model.learning_rate = lr;
    }
    app_config.validate().context("validating configuration")?;

    let manager = CheckpointManager::from_config(&app_config.checkpoint)?;
    let trainer = Trainer::new(app_config.training.clone(), manager);
    let mut model = LinearRegressor::new(app_config.model.clone());

    let start_epoch = if cli.resume {
        match trainer.resume(&mut model)? {
            Some(point) => {
                println!(
                    "Resumed from {} (epoch {})",
                    point.checkpoint_id, point.context.epoch
                );
                point.next_epoch()
            }
            None => {
                println!("No checkpoint found, starting fresh");
                1
            }
        }
    } else {
        1
    };

    let summary = trainer.train(&mut model, start_epoch)?;

    println!("-------------------------------------------");
    println!("Epochs run:  {}", summary.epochs_run);
    if let Some(loss) = summary.final_loss {
        println!("Final loss:  {loss:.6}");
    }
    println!("Model:       y = {:.4} * x + {:.4}", model.weight(), model.bias());
    println!("Saved:       {}", summary.checkpoints_saved.join(", "));
    println!("Pruned:      {}", summary.checkpoints_pruned.len());
    let retained = trainer.checkpoint_manager().list()?;
    println!("Retained:    {}", retained.join(", "));
    Ok(())
}
