//! Training infrastructure: the online trainer, rolling metrics, progress
//! messages for live watchers, and winner-move extraction from game logs.

pub mod game_log;
pub mod metrics;
pub mod progress;
pub mod sample;
pub mod trainer;

pub use game_log::{GameLog, RoundRecord};
pub use metrics::{ThroughputWindow, TrainingMetrics};
pub use progress::{MetricsSnapshot, TrainingCommand, TrainingUpdate};
pub use sample::TrainingSample;
pub use trainer::{Trainer, TrainerConfig, TrainingSummary};
