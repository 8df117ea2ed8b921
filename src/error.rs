use std::path::PathBuf;

use crate::network::{CacheKind, PassPhase};

/// Errors raised by the network engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("layer {layer} expects {expected} values, got {actual}")]
    ShapeMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{cache} of neuron {index} in layer {layer} read before the pass that fills it")]
    UninitializedAccess {
        layer: usize,
        index: usize,
        cache: CacheKind,
    },

    #[error("topology mismatch: expected {expected:?}, got {actual:?}")]
    TopologyMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("per-pass caches are stale (network is in phase '{phase}'); run a forward pass first")]
    StaleCacheViolation { phase: PassPhase },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors raised by the move-selection loop.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("no legal move available")]
    NoLegalMoves,

    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("stored network state is unusable: {0}")]
    State(#[from] NetworkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("no training samples supplied")]
    EmptySampleSet,

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
