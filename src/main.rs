use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use ckpt_keeper::checkpoint::{self, CheckpointManager, KeepCount};
use ckpt_keeper::config::AppConfig;
use ckpt_keeper::store::FsStore;
use ckpt_keeper::training::TrainingSnapshot;

/// Inspect and prune training checkpoints.
#[derive(Parser)]
#[command(name = "ckpt", about = "Inspect and prune training checkpoints")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true, default_value = "ckpt.toml")]
    config: PathBuf,

    /// Override the checkpoint directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Override the checkpoint name pattern, e.g. "check_*.ckpt"
    #[arg(long, global = true)]
    pattern: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List checkpoints, oldest first
    List,
    /// Print the newest checkpoint id
    Latest,
    /// Delete all but the newest checkpoints
    Prune {
        /// How many of the newest checkpoints to keep (defaults to config)
        #[arg(long, allow_negative_numbers = true)]
        keep: Option<i64>,

        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
    /// Describe one checkpoint
    Show {
        /// Checkpoint id; defaults to the newest
        id: Option<String>,
    },
    /// Write a config file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ckpt_keeper::logging::init(cli.verbose);

    match &cli.command {
        Command::InitConfig { force } => init_config(&cli.config, *force),
        Command::List => list(&open_manager(&cli)?),
        Command::Latest => latest(&open_manager(&cli)?),
        Command::Prune { keep, dry_run } => {
            let manager = open_manager(&cli)?;
            let keep = match keep {
                Some(n) => KeepCount::try_from(*n)?,
                None => manager.keep(),
            };
            prune(&manager, keep, *dry_run)
        }
        Command::Show { id } => show(&open_manager(&cli)?, id.as_deref()),
    }
}

/// Load the config file, apply CLI overrides, and build a filesystem manager.
fn open_manager(cli: &Cli) -> Result<CheckpointManager<FsStore>> {
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(dir) = &cli.dir {
        config.checkpoint.checkpoint_dir = dir.clone();
    }
    if let Some(pattern) = &cli.pattern {
        config.checkpoint.pattern = pattern.clone();
    }

    let naming = config.checkpoint.naming().context("parsing checkpoint pattern")?;
    Ok(CheckpointManager::new(
        FsStore::new(&config.checkpoint.checkpoint_dir),
        naming,
        config.checkpoint.keep_last_n,
    ))
}

fn list(manager: &CheckpointManager<FsStore>) -> Result<()> {
    let ids = manager.list()?;
    if ids.is_empty() {
        println!(
            "No checkpoints matching '{}' in {}",
            manager.naming().pattern(),
            manager.store().root().display()
        );
    }
    for id in &ids {
        println!("{id}");
    }
    Ok(())
}

fn latest(manager: &CheckpointManager<FsStore>) -> Result<()> {
    let ids = manager.list()?;
    match checkpoint::latest(&ids) {
        Some(id) => println!("{id}"),
        None => bail!("no checkpoint available"),
    }
    Ok(())
}

fn prune(manager: &CheckpointManager<FsStore>, keep: KeepCount, dry_run: bool) -> Result<()> {
    let ids = manager.list()?;
    if dry_run {
        let doomed = checkpoint::select_for_removal(&ids, keep);
        for id in doomed {
            println!("would delete {id}");
        }
        println!("{} to delete, {} kept", doomed.len(), ids.len() - doomed.len());
        return Ok(());
    }

    let removed = manager.prune(&ids, keep)?;
    for id in &removed {
        println!("deleted {id}");
    }
    println!("{} deleted, {} kept", removed.len(), ids.len() - removed.len());
    Ok(())
}

fn show(manager: &CheckpointManager<FsStore>, id: Option<&str>) -> Result<()> {
    let (id, payload) = match id {
        Some(id) => (id.to_string(), manager.load(id)?),
        None => match manager.load_latest()? {
            Some(found) => found,
            None => bail!("no checkpoint available"),
        },
    };

    println!("id:     {id}");
    println!("bytes:  {}", payload.len());
    if let Some(stamp) = manager.naming().stamp_of(&id) {
        println!("stamp:  {stamp}");
    }
    // Payloads written by other tools are opaque; only describe our own.
    if let Ok(snapshot) = TrainingSnapshot::decode(&id, &payload) {
        println!("model:  {}", snapshot.model);
        println!("epoch:  {}", snapshot.epoch);
        println!("loss:   {:.6}", snapshot.loss);
        println!("time:   {}", snapshot.timestamp);
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let toml = AppConfig::default_toml().context("serializing default config")?;
    std::fs::write(path, toml).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
