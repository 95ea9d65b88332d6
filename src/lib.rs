pub mod config;
pub mod error;
pub mod logger;
pub mod scheduler;

pub use config::Settings;
pub use error::{Result, SchedulerError};
pub use scheduler::{Summary, TaskOutcome, TaskResult, TaskScheduler};
