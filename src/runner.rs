//! Progress runner state machine
//!
//! A [`ProgressRunner`] advances an integer progress value by a fixed
//! increment after each fixed delay until a maximum is reached. The timed
//! wait between ticks is the only suspension point and it is cancellable:
//! a cancelled run keeps the progress reached so far, and calling
//! [`ProgressRunner::run`] again continues from that value with the same
//! configuration.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors produced when validating runner configuration.
///
/// Raised synchronously at construction; no runner instance is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidConfiguration {
    /// `max_progress` must be greater than zero.
    #[error("max_progress must be positive")]
    MaxProgressZero,
    /// `progress_increment` must be greater than zero.
    #[error("progress_increment must be positive")]
    IncrementZero,
}

/// A single participant advancing toward a finish line in timed steps.
///
/// Configuration is fixed at construction; `current_progress` is the only
/// mutable state and is written exclusively by the run loop. The `&mut self`
/// receiver on [`run`](Self::run) guarantees a single active loop per
/// instance, while [`gauge`](Self::gauge) hands out shared read access for
/// concurrent observers.
#[derive(Debug)]
pub struct ProgressRunner {
    name: String,
    max_progress: u32,
    progress_increment: u32,
    delay_interval: Duration,
    initial_progress: u32,
    current: Arc<AtomicU32>,
}

impl ProgressRunner {
    /// Create a runner starting from zero progress.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfiguration`] when `max_progress` or
    /// `progress_increment` is zero.
    pub fn new(
        name: impl Into<String>,
        max_progress: u32,
        progress_increment: u32,
        delay_interval: Duration,
    ) -> Result<Self, InvalidConfiguration> {
        Self::with_initial_progress(name, max_progress, progress_increment, delay_interval, 0)
    }

    /// Create a runner starting from a caller-supplied progress value.
    ///
    /// An initial value beyond `max_progress` is folded back onto it, so the
    /// at-rest invariant `current_progress <= max_progress` always holds.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfiguration`] when `max_progress` or
    /// `progress_increment` is zero. Validation happens here, before any run
    /// loop starts.
    pub fn with_initial_progress(
        name: impl Into<String>,
        max_progress: u32,
        progress_increment: u32,
        delay_interval: Duration,
        initial_progress: u32,
    ) -> Result<Self, InvalidConfiguration> {
        if max_progress == 0 {
            return Err(InvalidConfiguration::MaxProgressZero);
        }
        if progress_increment == 0 {
            return Err(InvalidConfiguration::IncrementZero);
        }

        let initial = initial_progress.min(max_progress);
        Ok(Self {
            name: name.into(),
            max_progress,
            progress_increment,
            delay_interval,
            initial_progress: initial,
            current: Arc::new(AtomicU32::new(initial)),
        })
    }

    /// Drive the runner until the finish line or cancellation.
    ///
    /// Each tick sleeps for `delay_interval`, then adds `progress_increment`,
    /// clamped at `max_progress` (so a maximum that is not a multiple of the
    /// increment still lands exactly on the maximum). Cancelling `cancel`
    /// while the sleep is pending exits immediately without incrementing;
    /// cancellation is a normal exit, not an error. A later call with a fresh
    /// token continues from the preserved progress, and once the maximum has
    /// been reached further calls return without waiting.
    pub async fn run(&mut self, cancel: &CancellationToken) {
        while self.current_progress() < self.max_progress {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    let progress = self.current_progress();
                    info!(name = %self.name, progress, "Run cancelled during delay");
                    return;
                }
                () = tokio::time::sleep(self.delay_interval) => {
                    let next = self
                        .current_progress()
                        .saturating_add(self.progress_increment)
                        .min(self.max_progress);
                    self.current.store(next, Ordering::Relaxed);
                }
            }
        }
        debug!(name = %self.name, max_progress = self.max_progress, "Run complete");
    }

    /// Return progress to the initial value.
    ///
    /// Takes `&mut self`, so a reset cannot race an active run loop.
    pub fn reset(&mut self) {
        self.current.store(self.initial_progress, Ordering::Relaxed);
    }

    /// Display label of this runner.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper bound on progress.
    #[must_use]
    pub const fn max_progress(&self) -> u32 {
        self.max_progress
    }

    /// Amount added per tick.
    #[must_use]
    pub const fn progress_increment(&self) -> u32 {
        self.progress_increment
    }

    /// Delay between ticks.
    #[must_use]
    pub const fn delay_interval(&self) -> Duration {
        self.delay_interval
    }

    /// Progress value the runner started from (and returns to on reset).
    #[must_use]
    pub const fn initial_progress(&self) -> u32 {
        self.initial_progress
    }

    /// Progress reached so far: a whole number of completed ticks times the
    /// increment, on top of the initial value.
    #[must_use]
    pub fn current_progress(&self) -> u32 {
        self.current.load(Ordering::Relaxed)
    }

    /// Completion ratio in `0.0..=1.0`, for progress-bar style rendering.
    #[must_use]
    pub fn progress_fraction(&self) -> f32 {
        self.current_progress() as f32 / self.max_progress as f32
    }

    /// Whether the finish line has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_progress() >= self.max_progress
    }

    /// Cheap cloneable read handle for concurrent observers.
    ///
    /// Gauges share the runner's progress counter, so a gauge taken before a
    /// run starts keeps observing while the run loop owns the runner.
    #[must_use]
    pub fn gauge(&self) -> ProgressGauge {
        ProgressGauge {
            current: Arc::clone(&self.current),
            max_progress: self.max_progress,
        }
    }

    /// Point-in-time view of the runner for display layers.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            name: self.name.clone(),
            current_progress: self.current_progress(),
            max_progress: self.max_progress,
            fraction: self.progress_fraction(),
        }
    }
}

/// Read-only handle onto a runner's progress counter.
#[derive(Debug, Clone)]
pub struct ProgressGauge {
    current: Arc<AtomicU32>,
    max_progress: u32,
}

impl ProgressGauge {
    /// Progress reached so far.
    #[must_use]
    pub fn current_progress(&self) -> u32 {
        self.current.load(Ordering::Relaxed)
    }

    /// Upper bound on progress.
    #[must_use]
    pub const fn max_progress(&self) -> u32 {
        self.max_progress
    }

    /// Completion ratio in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.current_progress() as f32 / self.max_progress as f32
    }

    /// Whether the finish line has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_progress() >= self.max_progress
    }
}

/// Serializable point-in-time view of a runner, for polling display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Display label of the runner.
    pub name: String,
    /// Progress reached so far.
    pub current_progress: u32,
    /// Upper bound on progress.
    pub max_progress: u32,
    /// Completion ratio in `0.0..=1.0`.
    pub fraction: f32,
}
