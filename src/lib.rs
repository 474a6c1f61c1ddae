#![deny(missing_docs)]
//! Timed, cancellable progress advancement.
//!
//! A [`ProgressRunner`] sleeps for a fixed delay, adds a fixed increment, and
//! repeats until a maximum is reached. The sleep is the only suspension point
//! and is cancellable via a [`tokio_util::sync::CancellationToken`]; a
//! cancelled run keeps its progress, and running again resumes from it.
//! [`RunnerDriver`] wraps a runner with spawn/pause/resume control on the
//! tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! use pacer::ProgressRunner;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut runner = ProgressRunner::new("player", 100, 1, Duration::from_millis(500))
//!     .expect("valid configuration");
//! runner.run(&CancellationToken::new()).await;
//! assert_eq!(runner.current_progress(), 100);
//! # }
//! ```

/// Runner lifecycle driving on the tokio runtime.
pub mod driver;
/// Progress runner state machine.
pub mod runner;

pub use driver::{DriverError, RunnerDriver};
pub use runner::{InvalidConfiguration, ProgressGauge, ProgressRunner, ProgressSnapshot};
