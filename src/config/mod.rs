pub mod settings;

pub use settings::{LoggingConfig, ReportConfig, ReportFormat, SchedulerConfig, Settings};
