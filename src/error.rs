//! Scheduler error types.
//!
//! Task failures are not errors at this level: they are captured as data in
//! [`TaskOutcome`](crate::scheduler::TaskOutcome). Only misconfiguration and
//! report I/O surface as a [`SchedulerError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid concurrency limit {0}: must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
