//! Runner lifecycle driving
//!
//! Pairs a [`ProgressRunner`] with the cancellation token for its active run,
//! the way a host scheduler starts, pauses, and resumes the loop. The driver
//! holds the runner itself while idle and the spawned task's join handle while
//! running; pausing cancels the token and recovers the runner with its
//! progress intact.

use crate::runner::{ProgressGauge, ProgressRunner, ProgressSnapshot};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors surfaced while driving a runner task.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The spawned run task panicked or was aborted externally.
    #[error("runner task failed to join: {0}")]
    Join(#[from] JoinError),
    /// The runner was lost after a previous failed join.
    #[error("runner was lost after a failed join")]
    Lost,
}

enum DriverState {
    /// No active loop; the runner (fresh, paused, or finished) is held here.
    Idle(ProgressRunner),
    /// A run loop is executing on the tokio runtime.
    Running(JoinHandle<ProgressRunner>),
    /// A join failed and the runner could not be recovered.
    Poisoned,
}

/// Drives a [`ProgressRunner`] on the tokio runtime with pause/resume control.
///
/// The driver is the single writer-side owner: observers read through
/// [`gauge`](Self::gauge) clones. Dropping the driver cancels any active run.
pub struct RunnerDriver {
    state: DriverState,
    token: CancellationToken,
    gauge: ProgressGauge,
    name: String,
}

impl RunnerDriver {
    /// Wrap a runner, ready to start.
    #[must_use]
    pub fn new(runner: ProgressRunner) -> Self {
        let gauge = runner.gauge();
        let name = runner.name().to_string();
        Self {
            state: DriverState::Idle(runner),
            token: CancellationToken::new(),
            gauge,
            name,
        }
    }

    /// Start or resume the run loop. No-op while a loop is already active,
    /// and a loop that already reached the maximum exits immediately.
    pub fn start(&mut self) {
        match std::mem::replace(&mut self.state, DriverState::Poisoned) {
            DriverState::Idle(mut runner) => {
                // Fresh token per run; the previous one stays cancelled.
                self.token = CancellationToken::new();
                let token = self.token.clone();
                debug!(
                    name = %self.name,
                    progress = runner.current_progress(),
                    "Starting run loop"
                );
                self.state = DriverState::Running(tokio::spawn(async move {
                    runner.run(&token).await;
                    runner
                }));
            }
            other => self.state = other,
        }
    }

    /// Pause the active run loop, preserving progress for a later
    /// [`start`](Self::start). Pausing while idle just reports the current
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Join`] if the run task panicked, and
    /// [`DriverError::Lost`] on every call after such a failure.
    pub async fn pause(&mut self) -> Result<u32, DriverError> {
        match std::mem::replace(&mut self.state, DriverState::Poisoned) {
            DriverState::Running(handle) => {
                self.token.cancel();
                let runner = handle.await?;
                let progress = runner.current_progress();
                info!(name = %self.name, progress, "Run loop paused");
                self.state = DriverState::Idle(runner);
                Ok(progress)
            }
            DriverState::Idle(runner) => {
                let progress = runner.current_progress();
                self.state = DriverState::Idle(runner);
                Ok(progress)
            }
            DriverState::Poisoned => Err(DriverError::Lost),
        }
    }

    /// Wait for the active run loop to reach the finish line. Waiting while
    /// idle reports the current value without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Join`] if the run task panicked, and
    /// [`DriverError::Lost`] on every call after such a failure.
    pub async fn wait(&mut self) -> Result<u32, DriverError> {
        match std::mem::replace(&mut self.state, DriverState::Poisoned) {
            DriverState::Running(handle) => {
                let runner = handle.await?;
                let progress = runner.current_progress();
                self.state = DriverState::Idle(runner);
                Ok(progress)
            }
            DriverState::Idle(runner) => {
                let progress = runner.current_progress();
                self.state = DriverState::Idle(runner);
                Ok(progress)
            }
            DriverState::Poisoned => Err(DriverError::Lost),
        }
    }

    /// Whether a run loop is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(&self.state, DriverState::Running(handle) if !handle.is_finished())
    }

    /// Read handle onto the shared progress counter.
    #[must_use]
    pub fn gauge(&self) -> ProgressGauge {
        self.gauge.clone()
    }

    /// Display label of the underlying runner.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Progress reached so far.
    #[must_use]
    pub fn current_progress(&self) -> u32 {
        self.gauge.current_progress()
    }

    /// Whether the finish line has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.gauge.is_finished()
    }

    /// Point-in-time view for display layers.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            name: self.name.clone(),
            current_progress: self.gauge.current_progress(),
            max_progress: self.gauge.max_progress(),
            fraction: self.gauge.fraction(),
        }
    }
}

impl Drop for RunnerDriver {
    fn drop(&mut self) {
        if matches!(&self.state, DriverState::Running(_)) {
            self.token.cancel();
        }
    }
}
