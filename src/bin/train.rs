use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use clap::Parser;

use tictactoe_brain::agent::NetworkAgent;
use tictactoe_brain::checkpoint::{CheckpointManager, CheckpointManagerConfig};
use tictactoe_brain::config::AppConfig;
use tictactoe_brain::network::Network;
use tictactoe_brain::training::{Trainer, TrainingCommand, TrainingSample};

/// Train the move-predicting network on recorded winner moves.
#[derive(Parser)]
#[command(name = "train", about = "Train the tic-tac-toe move network")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// JSON file holding an array of {input, expectedOutput} samples
    #[arg(long)]
    samples: PathBuf,

    /// Override number of samples to draw
    #[arg(long)]
    iterations: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Also write the trained network state to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(iterations) = cli.iterations {
        app_config.training.num_samples = iterations;
    }
    if let Some(lr) = cli.lr {
        app_config.network.learning_rate = lr;
    }
    app_config.validate().context("validating configuration")?;

    let samples = load_samples(&cli.samples)?;
    log::info!("loaded {} samples from {}", samples.len(), cli.samples.display());

    let (mut network, resumed_samples) = if cli.resume {
        resume_network(&app_config)?
    } else {
        (Network::from_config(&app_config.network)?, 0)
    };

    let trainer = Trainer::with_checkpoints(
        app_config.training.clone(),
        app_config.checkpoint.clone(),
    )
    .resume_from(resumed_samples);

    let stop = Arc::new(AtomicBool::new(false));
    let (cmd_tx, cmd_rx) = mpsc::channel::<TrainingCommand>();
    spawn_stdin_watcher(stop.clone(), cmd_tx);
    log::info!("type 'q' + Enter to stop, 's' + Enter to save a checkpoint");

    let summary = trainer
        .train(&mut network, &samples, &stop, None, Some(&cmd_rx))
        .context("training")?;

    if let Some(path) = trainer
        .save_checkpoint(&network, &summary)
        .context("saving final checkpoint")?
    {
        log::info!("final checkpoint: {}", path.display());
    }

    if let Some(output) = &cli.output {
        let json = network
            .export_state()
            .to_json_pretty()
            .context("serializing network state")?;
        std::fs::write(output, json)
            .with_context(|| format!("writing network state to {}", output.display()))?;
        log::info!("network state written to {}", output.display());
    }

    Ok(())
}

fn load_samples(path: &Path) -> Result<Vec<TrainingSample>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading samples from {}", path.display()))?;
    let samples: Vec<TrainingSample> = serde_json::from_str(&json)
        .with_context(|| format!("parsing samples in {}", path.display()))?;
    Ok(samples)
}

/// Restore the latest checkpoint into a network shaped by the config, or
/// build a fresh one when none exists.
fn resume_network(config: &AppConfig) -> Result<(Network, usize)> {
    let manager = CheckpointManager::new(CheckpointManagerConfig {
        checkpoint_dir: config.training.checkpoint_dir.clone(),
        ..config.checkpoint.clone()
    });
    match manager.load_latest() {
        Ok(data) => {
            let fresh = Network::from_config(&config.network)?;
            let agent = NetworkAgent::restore_into(fresh, &data.state, config.agent.clone())
                .with_context(|| format!("restoring network from {}", data.path.display()))?;
            let mut network = agent.into_network();
            network.set_learning_rate(config.network.learning_rate);
            log::info!(
                "resumed from {} ({} samples)",
                data.path.display(),
                data.metadata.samples_processed
            );
            Ok((network, data.metadata.samples_processed))
        }
        Err(e) => {
            log::info!("no checkpoint found ({e}), starting fresh");
            Ok((Network::from_config(&config.network)?, 0))
        }
    }
}

/// Watch stdin for `q` (stop after the current sample) and `s` (save a
/// checkpoint).
fn spawn_stdin_watcher(stop: Arc<AtomicBool>, cmd_tx: mpsc::Sender<TrainingCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "q" | "Q" => {
                    stop.store(true, Ordering::Relaxed);
                    break;
                }
                "s" | "S" => {
                    let _ = cmd_tx.send(TrainingCommand::SaveCheckpoint);
                }
                _ => {}
            }
        }
    });
}
