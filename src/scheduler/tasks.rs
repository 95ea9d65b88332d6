use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub(crate) type BlockingAction<E> = Box<dyn FnOnce() -> Result<(), E> + Send + 'static>;
pub(crate) type AsyncAction<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send + 'static>>;

/// Work attached to a task.
pub(crate) enum Action<E> {
    /// Runs on the blocking thread pool; may sleep or do blocking I/O.
    Blocking(BlockingAction<E>),
    /// Runs as its own tokio task.
    Async(AsyncAction<E>),
}

impl<E> Action<E> {
    fn kind(&self) -> &'static str {
        match self {
            Action::Blocking(_) => "blocking",
            Action::Async(_) => "async",
        }
    }
}

/// A named unit of work. Names need not be unique.
pub(crate) struct Task<E> {
    pub(crate) name: String,
    pub(crate) action: Action<E>,
}

impl<E> fmt::Debug for Task<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("action", &self.action.kind())
            .finish()
    }
}

/// How a task's action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<E> {
    Success,
    /// The action returned this error value.
    Failure(E),
    /// The action never returned normally (panic, or cancelled by runtime shutdown).
    Aborted { reason: String },
}

impl<E> TaskOutcome<E> {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            TaskOutcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// Short status word used in status lines and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Success => "ok",
            TaskOutcome::Failure(_) => "failed",
            TaskOutcome::Aborted { .. } => "aborted",
        }
    }
}

impl<E> From<Result<(), E>> for TaskOutcome<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => TaskOutcome::Success,
            Err(err) => TaskOutcome::Failure(err),
        }
    }
}

/// Record of one task execution. Created once by the unit that ran the task.
#[derive(Debug, Clone)]
pub struct TaskResult<E> {
    pub name: String,
    /// Monotonic time spent inside the action.
    pub duration: Duration,
    pub started_at: DateTime<Utc>,
    pub outcome: TaskOutcome<E>,
}

impl<E> TaskResult<E> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
