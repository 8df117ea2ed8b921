//! # Tic-tac-toe brain
//!
//! A small fully connected feed-forward network, trained online one sample at
//! a time by backpropagation, that learns to pick tic-tac-toe moves from the
//! winners of past games.
//!
//! ## Modules
//!
//! - [`network`]: Synapse arena, neurons, layers, forward/backward passes, persisted state
//! - [`agent`]: Move selection with retry-on-illegal, random mover, board encoding helpers
//! - [`training`]: Online trainer, rolling metrics, progress messages, game logs
//! - [`checkpoint`]: Network persistence and versioning on disk
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod network;
pub mod training;
