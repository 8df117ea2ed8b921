use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rolling record of per-sample outcomes.
pub struct TrainingMetrics {
    hits: VecDeque<bool>,
    errors: VecDeque<f64>,
    capacity: usize,
    total_samples: usize, // lifetime count, never capped
    failed_samples: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            hits: VecDeque::with_capacity(capacity),
            errors: VecDeque::with_capacity(capacity),
            capacity,
            total_samples: 0,
            failed_samples: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(5000)
    }

    /// Record a trained sample: whether the pre-update prediction hit, and
    /// its squared error.
    pub fn record_sample(&mut self, hit: bool, squared_error: f64) {
        self.total_samples += 1;
        self.hits.push_back(hit);
        if self.hits.len() > self.capacity {
            self.hits.pop_front();
        }
        self.errors.push_back(squared_error);
        if self.errors.len() > self.capacity {
            self.errors.pop_front();
        }
    }

    pub fn record_failure(&mut self) {
        self.failed_samples += 1;
    }

    /// Fraction of hits over the last N samples.
    pub fn success_ratio(&self, last_n: usize) -> f64 {
        let n = self.hits.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self.hits.iter().rev().take(n).filter(|&&h| h).count();
        hits as f64 / n as f64
    }

    /// Mean squared error over the last N samples.
    pub fn average_error(&self, last_n: usize) -> f64 {
        let n = self.errors.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        self.errors.iter().rev().take(n).sum::<f64>() / n as f64
    }

    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    pub fn failed_samples(&self) -> usize {
        self.failed_samples
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Training throughput since the last log line.
///
/// Only totals are kept: busy time spent in `train_step` and the number of
/// samples drawn. Checkpoint writes and pauses are booked as overhead and
/// left out of the samples-per-second figure.
pub struct ThroughputWindow {
    started: Instant,
    samples: usize,
    busy: Duration,
    overhead: Duration,
}

impl ThroughputWindow {
    pub fn new() -> Self {
        ThroughputWindow {
            started: Instant::now(),
            samples: 0,
            busy: Duration::ZERO,
            overhead: Duration::ZERO,
        }
    }

    /// Book one drawn sample, whether it trained or failed.
    pub fn record_sample(&mut self, took: Duration) {
        self.samples += 1;
        self.busy += took;
    }

    pub fn record_overhead(&mut self, d: Duration) {
        self.overhead += d;
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Mean time per sample in milliseconds.
    pub fn mean_sample_ms(&self) -> f32 {
        if self.samples == 0 {
            return 0.0;
        }
        (self.busy.as_secs_f64() * 1000.0 / self.samples as f64) as f32
    }

    /// Samples per wall-clock second, overhead excluded.
    pub fn samples_per_sec(&self) -> f32 {
        let net = self.started.elapsed().saturating_sub(self.overhead);
        if net.is_zero() {
            return 0.0;
        }
        (self.samples as f64 / net.as_secs_f64()) as f32
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ThroughputWindow {
    fn default() -> Self {
        Self::new()
    }
}
