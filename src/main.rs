use clap::Parser;
use fanout_scheduler::config::ReportFormat;
use fanout_scheduler::{logger, Settings, Summary, TaskScheduler};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Demo batch: name and simulated work time.
const DEMO_TASKS: &[(&str, u64)] = &[
    ("task-1", 1000),
    ("task-2", 500),
    ("task-3", 800),
    ("task-4", 300),
];

#[derive(Parser)]
#[command(name = "fanout-scheduler")]
#[command(about = "Run a batch of tasks concurrently and report per-task timings")]
struct Cli {
    #[arg(short, long, default_value = "config/config.toml")]
    config: String,

    /// Limit how many tasks run at once (default: all of them)
    #[arg(short = 'n', long)]
    max_concurrency: Option<usize>,

    /// Make the named demo task fail; may be repeated
    #[arg(long, value_name = "NAME")]
    fail: Vec<String>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Suppress per-task status lines
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)?;
    if let Some(limit) = cli.max_concurrency {
        settings.scheduler.max_concurrency = Some(limit);
    }
    if cli.json {
        settings.report.format = ReportFormat::Json;
    }
    if cli.quiet || settings.report.format == ReportFormat::Json {
        settings.scheduler.print_status = false;
    }

    logger::init(&settings.logging)?;

    info!("Starting fanout-scheduler v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", cli.config);

    let mut scheduler: TaskScheduler = TaskScheduler::with_config(settings.scheduler.clone())?;
    for &(name, millis) in DEMO_TASKS {
        let should_fail = cli.fail.iter().any(|f| f == name);
        scheduler.add_task(name, move || {
            std::thread::sleep(Duration::from_millis(millis));
            if should_fail {
                anyhow::bail!("{} was asked to fail", name);
            }
            Ok(())
        });
    }
    for name in cli.fail.iter().filter(|f| !DEMO_TASKS.iter().any(|(n, _)| n == f)) {
        warn!("--fail {} matches no demo task", name);
    }

    let started = Instant::now();
    scheduler.execute().await;
    let elapsed = started.elapsed();

    let summary = scheduler.summary();
    match settings.report.format {
        ReportFormat::Text => {
            scheduler.print_summary()?;
            println!("elapsed: {:?}", elapsed);
        }
        ReportFormat::Json => {
            let report = serde_json::json!({
                "summary": summary,
                "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(exit_code(&summary))
}

/// Non-zero when any task failed or aborted.
fn exit_code(summary: &Summary) -> ExitCode {
    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
