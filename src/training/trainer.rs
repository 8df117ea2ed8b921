use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointMetrics};
use crate::error::TrainingError;
use crate::network::Network;
use crate::training::metrics::{ThroughputWindow, TrainingMetrics};
use crate::training::progress::{MetricsSnapshot, TrainingCommand, TrainingUpdate};
use crate::training::TrainingSample;

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Upper bound on samples trained per run.
    pub num_samples: usize,
    pub log_interval: usize,
    /// Samples between two cooperative pauses.
    pub pause_interval: usize,
    pub pause_ms: u64,
    /// Window of the rolling success ratio.
    pub ratio_window: usize,
    /// 0 disables periodic checkpoints.
    pub checkpoint_interval: usize,
    pub checkpoint_dir: PathBuf,
    /// Fixes the sample-picking order when set.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_samples: 50_000,
            log_interval: 500,
            pause_interval: 500,
            pause_ms: 200,
            ratio_window: 5000,
            checkpoint_interval: 0,
            checkpoint_dir: PathBuf::from("checkpoints"),
            seed: None,
        }
    }
}

/// What a finished (or stopped) run achieved.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub samples_processed: usize,
    pub failed_samples: usize,
    pub success_ratio: f64,
    pub average_error: f64,
    pub stopped_early: bool,
    pub elapsed: Duration,
}

/// Online trainer: draws samples at random and runs one train step each.
pub struct Trainer {
    config: TrainerConfig,
    checkpoint_manager: Option<CheckpointManager>,
    /// Samples processed by earlier sessions, added to checkpoint counts.
    resumed_samples: usize,
}

impl Trainer {
    /// A trainer that never writes checkpoints.
    pub fn new(config: TrainerConfig) -> Self {
        Trainer {
            config,
            checkpoint_manager: None,
            resumed_samples: 0,
        }
    }

    /// A trainer that checkpoints into `config.checkpoint_dir`, retaining per
    /// `checkpoint`.
    pub fn with_checkpoints(config: TrainerConfig, checkpoint: CheckpointManagerConfig) -> Self {
        let checkpoint_manager = CheckpointManager::new(CheckpointManagerConfig {
            checkpoint_dir: config.checkpoint_dir.clone(),
            ..checkpoint
        });
        Trainer {
            config,
            checkpoint_manager: Some(checkpoint_manager),
            resumed_samples: 0,
        }
    }

    /// Continue the sample count of a restored checkpoint.
    pub fn resume_from(mut self, samples_processed: usize) -> Self {
        self.resumed_samples = samples_processed;
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn checkpoint_manager(&self) -> Option<&CheckpointManager> {
        self.checkpoint_manager.as_ref()
    }

    /// Run the training loop until `num_samples` have been drawn or `stop` is
    /// raised. `stop` is polled before each sample; the sample in flight
    /// always completes.
    pub fn train(
        &self,
        network: &mut Network,
        samples: &[TrainingSample],
        stop: &AtomicBool,
        updates: Option<&mpsc::Sender<TrainingUpdate>>,
        commands: Option<&mpsc::Receiver<TrainingCommand>>,
    ) -> Result<TrainingSummary, TrainingError> {
        if samples.is_empty() {
            return Err(TrainingError::EmptySampleSet);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut metrics = TrainingMetrics::with_capacity(self.config.ratio_window);
        let mut throughput = ThroughputWindow::new();
        let window = self.config.ratio_window;
        let started = Instant::now();
        let mut stopped_early = false;

        log::info!(
            "training {} on {} samples (up to {} draws, lr {})",
            format_widths(&network.layer_widths()),
            samples.len(),
            self.config.num_samples,
            network.learning_rate()
        );

        for drawn in 1..=self.config.num_samples {
            if stop.load(Ordering::Relaxed) {
                stopped_early = true;
                break;
            }

            if let Some(rx) = commands {
                while let Ok(cmd) = rx.try_recv() {
                    match cmd {
                        TrainingCommand::SaveCheckpoint => {
                            let t0 = Instant::now();
                            self.checkpoint_and_report(network, &metrics, updates);
                            throughput.record_overhead(t0.elapsed());
                        }
                    }
                }
            }

            let index = rng.random_range(0..samples.len());
            let sample = &samples[index];

            let t0 = Instant::now();
            match network.train_step(&sample.input, &sample.expected_output) {
                Ok(output) => {
                    metrics.record_sample(sample.is_hit(&output), sample.squared_error(&output));
                }
                Err(error) => {
                    log::warn!("sample {index} skipped: {error}");
                    metrics.record_failure();
                    if let Some(tx) = updates {
                        let _ = tx.send(TrainingUpdate::SampleFailed { index, error });
                    }
                }
            }
            throughput.record_sample(t0.elapsed());

            if self.config.log_interval > 0 && drawn % self.config.log_interval == 0 {
                let snapshot = self.snapshot(&metrics, &throughput);
                log::info!(
                    "samples {}/{} | success({}): {:.1}% | mse: {:.4} | failed: {} | {:.0}/s",
                    drawn,
                    self.config.num_samples,
                    window,
                    snapshot.success_ratio * 100.0,
                    snapshot.average_error,
                    snapshot.failed_samples,
                    snapshot.samples_per_sec,
                );
                if let Some(tx) = updates {
                    let _ = tx.send(TrainingUpdate::Metrics(snapshot));
                }
                throughput.reset();
            }

            if self.config.checkpoint_interval > 0 && drawn % self.config.checkpoint_interval == 0 {
                let t0 = Instant::now();
                self.checkpoint_and_report(network, &metrics, updates);
                throughput.record_overhead(t0.elapsed());
            }

            if self.config.pause_ms > 0
                && self.config.pause_interval > 0
                && drawn % self.config.pause_interval == 0
            {
                let pause = Duration::from_millis(self.config.pause_ms);
                std::thread::sleep(pause);
                throughput.record_overhead(pause);
            }
        }

        let summary = TrainingSummary {
            samples_processed: metrics.total_samples(),
            failed_samples: metrics.failed_samples(),
            success_ratio: metrics.success_ratio(window),
            average_error: metrics.average_error(window),
            stopped_early,
            elapsed: started.elapsed(),
        };

        if stopped_early {
            log::info!("training stopped after {} samples", summary.samples_processed);
        }
        log::info!(
            "training complete: {} samples, {} failed, success {:.1}%, {:.1?}",
            summary.samples_processed,
            summary.failed_samples,
            summary.success_ratio * 100.0,
            summary.elapsed,
        );

        if let Some(tx) = updates {
            let _ = tx.send(TrainingUpdate::Finished);
        }
        Ok(summary)
    }

    /// One ordered pass over `samples`. Returns the fraction whose
    /// pre-update prediction was already a hit. A malformed sample aborts
    /// the pass.
    pub fn learn_all(
        network: &mut Network,
        samples: &[TrainingSample],
    ) -> Result<f64, TrainingError> {
        if samples.is_empty() {
            return Err(TrainingError::EmptySampleSet);
        }
        let mut hits = 0;
        for sample in samples {
            let output = network.train_step(&sample.input, &sample.expected_output)?;
            if sample.is_hit(&output) {
                hits += 1;
            }
        }
        Ok(hits as f64 / samples.len() as f64)
    }

    /// Save a checkpoint if this trainer has a manager. Returns the written
    /// directory.
    pub fn save_checkpoint(
        &self,
        network: &Network,
        summary: &TrainingSummary,
    ) -> Result<Option<PathBuf>, TrainingError> {
        let Some(manager) = &self.checkpoint_manager else {
            return Ok(None);
        };
        let metrics = CheckpointMetrics {
            success_ratio: summary.success_ratio,
            average_error: summary.average_error,
            failed_samples: summary.failed_samples,
        };
        let path = manager.save_checkpoint(
            network,
            &metrics,
            self.resumed_samples + summary.samples_processed,
        )?;
        Ok(Some(path))
    }

    fn checkpoint_and_report(
        &self,
        network: &Network,
        metrics: &TrainingMetrics,
        updates: Option<&mpsc::Sender<TrainingUpdate>>,
    ) {
        let Some(manager) = &self.checkpoint_manager else {
            log::warn!("checkpoint requested but no checkpoint directory is configured");
            return;
        };
        let window = self.config.ratio_window;
        let ckpt_metrics = CheckpointMetrics {
            success_ratio: metrics.success_ratio(window),
            average_error: metrics.average_error(window),
            failed_samples: metrics.failed_samples(),
        };
        let samples_processed = self.resumed_samples + metrics.total_samples();
        match manager.save_checkpoint(network, &ckpt_metrics, samples_processed) {
            Ok(path) => {
                log::info!("checkpoint saved: {}", path.display());
                if let Some(tx) = updates {
                    let _ = tx.send(TrainingUpdate::CheckpointSaved {
                        samples_processed,
                        path,
                    });
                }
            }
            Err(e) => log::error!("checkpoint failed: {e}"),
        }
    }

    fn snapshot(
        &self,
        metrics: &TrainingMetrics,
        throughput: &ThroughputWindow,
    ) -> MetricsSnapshot {
        let window = self.config.ratio_window;
        MetricsSnapshot {
            samples_processed: metrics.total_samples(),
            target_samples: self.config.num_samples,
            success_ratio: metrics.success_ratio(window),
            average_error: metrics.average_error(window),
            failed_samples: metrics.failed_samples(),
            samples_per_sec: throughput.samples_per_sec(),
            mean_sample_ms: throughput.mean_sample_ms(),
        }
    }
}

fn format_widths(widths: &[usize]) -> String {
    widths
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
