use serde::{Deserialize, Serialize};

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Rolling hit ratio over the trainer's ratio window.
    pub success_ratio: f64,
    pub average_error: f64,
    pub failed_samples: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub learning_rate: f64,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub samples_processed: usize,
    pub timestamp: u64,
    pub layer_widths: Vec<usize>,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: CheckpointHyperparameters,
}
