use std::path::PathBuf;

use crate::error::NetworkError;

/// Periodic metrics snapshot sent from the training loop to whoever watches it.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub samples_processed: usize,
    pub target_samples: usize,
    pub success_ratio: f64,
    pub average_error: f64,
    pub failed_samples: usize,
    pub samples_per_sec: f32,
    pub mean_sample_ms: f32,
}

/// Updates sent from the training loop.
#[derive(Debug, Clone)]
pub enum TrainingUpdate {
    Metrics(MetricsSnapshot),
    /// A sample was skipped; training carries on.
    SampleFailed {
        index: usize,
        error: NetworkError,
    },
    CheckpointSaved {
        samples_processed: usize,
        path: PathBuf,
    },
    Finished,
}

/// Commands sent to the training loop.
#[derive(Debug, Clone)]
pub enum TrainingCommand {
    SaveCheckpoint,
}
