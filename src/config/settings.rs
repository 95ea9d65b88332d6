use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "FANOUT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub scheduler: SchedulerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Cap on simultaneously running tasks. `None` starts every task at once.
    pub max_concurrency: Option<usize>,
    /// Print a status line to stdout as each task completes.
    pub print_status: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            print_status: true,
        }
    }
}

impl SchedulerConfig {
    /// Unbounded fan-out without per-task stdout lines.
    pub fn quiet() -> Self {
        Self {
            print_status: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.max_concurrency {
            Some(0) => Err(SchedulerError::InvalidConcurrency(0)),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

impl Settings {
    /// Load from an optional config file, then `FANOUT_*` environment overrides
    /// (`__` separates nested keys, e.g. `FANOUT_SCHEDULER__MAX_CONCURRENCY`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.scheduler.validate()?;
        Ok(settings)
    }
}
