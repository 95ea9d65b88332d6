//! Concurrent fan-out task scheduler.
//!
//! Tasks are registered up front, then [`TaskScheduler::execute`] starts one
//! execution unit per task and waits for all of them. Each unit times its own
//! action and sends exactly one [`TaskResult`] back over a channel; the
//! scheduler is the only owner of the results collection, so no lock is held
//! around task execution.

pub mod report;
pub mod tasks;

pub use report::{status_line, Summary};
pub use tasks::{TaskOutcome, TaskResult};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use chrono::Utc;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tasks::{Action, BlockingAction, Task};
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

pub struct TaskScheduler<E = anyhow::Error> {
    tasks: Vec<Task<E>>,
    results: Vec<TaskResult<E>>,
    config: SchedulerConfig,
}

impl TaskScheduler {
    /// Empty scheduler with the default configuration and `anyhow::Error` failures.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> Default for TaskScheduler<E> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            results: Vec::new(),
            config: SchedulerConfig::default(),
        }
    }
}

impl<E> TaskScheduler<E> {
    pub fn with_config(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tasks: Vec::new(),
            results: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register a blocking action. It runs on its own blocking-pool thread.
    pub fn add_task<F>(&mut self, name: impl Into<String>, action: F) -> &mut Self
    where
        F: FnOnce() -> std::result::Result<(), E> + Send + 'static,
    {
        self.tasks.push(Task {
            name: name.into(),
            action: Action::Blocking(Box::new(action)),
        });
        self
    }

    /// Register an async action. It runs as its own tokio task.
    pub fn add_async_task<F>(&mut self, name: impl Into<String>, action: F) -> &mut Self
    where
        F: Future<Output = std::result::Result<(), E>> + Send + 'static,
    {
        self.tasks.push(Task {
            name: name.into(),
            action: Action::Async(Box::pin(action)),
        });
        self
    }

    /// Number of registered tasks not yet executed.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Results in arrival order.
    pub fn results(&self) -> &[TaskResult<E>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TaskResult<E>> {
        self.results
    }

    pub fn summary(&self) -> Summary {
        Summary::from_results(&self.results)
    }

    pub fn write_summary<W: Write>(&self, out: &mut W) -> Result<()> {
        report::write_summary(&self.results, out)?;
        Ok(())
    }

    pub fn print_summary(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.write_summary(&mut out)?;
        out.flush().map_err(SchedulerError::from)
    }
}

impl<E> TaskScheduler<E>
where
    E: Display + Send + 'static,
{
    /// Run every pending task concurrently and wait for all of them.
    ///
    /// Task failures are recorded in the results, never returned. A task that
    /// never finishes keeps this future pending forever.
    pub async fn execute(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        info!(
            tasks = tasks.len(),
            max_concurrency = ?self.config.max_concurrency,
            "Executing task batch"
        );

        let limiter = self
            .config
            .max_concurrency
            .map(|permits| Arc::new(Semaphore::new(permits)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for task in tasks {
            let tx = tx.clone();
            let limiter = limiter.clone();
            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                // Receiver lives until every sender is dropped
                let _ = tx.send(run_task(task).await);
            });
        }
        drop(tx);

        while let Some(result) = rx.recv().await {
            self.record(result);
        }
        debug!(results = self.results.len(), "Task batch complete");
    }

    fn record(&mut self, result: TaskResult<E>) {
        match &result.outcome {
            TaskOutcome::Success => {
                info!(task = %result.name, duration = ?result.duration, "Task finished")
            }
            TaskOutcome::Failure(err) => {
                warn!(task = %result.name, duration = ?result.duration, error = %err, "Task failed")
            }
            TaskOutcome::Aborted { reason } => {
                warn!(task = %result.name, duration = ?result.duration, %reason, "Task aborted")
            }
        }
        if self.config.print_status {
            println!("{}", status_line(&result));
        }
        self.results.push(result);
    }
}

type Timed<E> = std::result::Result<(std::result::Result<(), E>, Duration), String>;

async fn run_task<E: Send + 'static>(task: Task<E>) -> TaskResult<E> {
    let Task { name, action } = task;
    let started_at = Utc::now();
    let start = Instant::now();

    // Each unit times only its own action
    let timed = match action {
        Action::Blocking(action) => run_blocking(action).await,
        Action::Async(action) => tokio::spawn(async move {
            let start = Instant::now();
            let result = action.await;
            (result, start.elapsed())
        })
        .await
        .map_err(abort_reason),
    };

    let (outcome, duration) = match timed {
        Ok((result, duration)) => (result.into(), duration),
        Err(reason) => (TaskOutcome::Aborted { reason }, start.elapsed()),
    };

    TaskResult {
        name,
        duration,
        started_at,
        outcome,
    }
}

/// Run a blocking action on a dedicated OS thread, so fan-out is not bounded
/// by the runtime's blocking pool.
async fn run_blocking<E: Send + 'static>(action: BlockingAction<E>) -> Timed<E> {
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("fanout-task".to_string())
        .spawn(move || {
            let start = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(action));
            let _ = tx.send((result, start.elapsed()));
        })
        .map_err(|e| format!("failed to spawn thread: {}", e))?;

    match rx.await {
        Ok((Ok(result), duration)) => Ok((result, duration)),
        Ok((Err(payload), _)) => Err(panic_reason(payload)),
        Err(_) => Err("worker thread exited without reporting".to_string()),
    }
}

fn abort_reason(err: JoinError) -> String {
    if err.is_cancelled() {
        return "cancelled".to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => panic_reason(payload),
        Err(err) => err.to_string(),
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    match message {
        Some(msg) => format!("panicked: {}", msg),
        None => "panicked".to_string(),
    }
}
