use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

struct NamedTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// Owns the relay's cancellation token and the background tasks that must
/// stop before the process exits.
pub struct ShutdownCoordinator {
    cancel: CancellationToken,
    tasks: Vec<NamedTask>,
    timeout: Duration,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ShutdownResult {
    Graceful,
    TimedOut { hung_tasks: Vec<&'static str> },
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::with_timeout(SHUTDOWN_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
            timeout,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn register_task(&mut self, name: &'static str, handle: JoinHandle<()>) {
        self.tasks.push(NamedTask { name, handle });
    }

    /// Cancels every task and waits for them, aborting whatever is still
    /// running once the timeout elapses.
    pub async fn shutdown(self) -> ShutdownResult {
        info!(tasks = self.tasks.len(), "Shutdown initiated; notifying tasks");
        self.cancel.cancel();

        let mut tasks = self.tasks;
        let wait_result = tokio::time::timeout(self.timeout, async {
            for task in tasks.iter_mut() {
                if let Err(err) = (&mut task.handle).await {
                    warn!(task = task.name, error = %err, "Task ended abnormally");
                }
            }
        })
        .await;

        if wait_result.is_ok() {
            info!("All tasks stopped gracefully");
            return ShutdownResult::Graceful;
        }

        let hung_tasks: Vec<&'static str> = tasks
            .iter()
            .filter(|task| !task.handle.is_finished())
            .map(|task| task.name)
            .collect();
        warn!(hung_tasks = ?hung_tasks, "Shutdown timed out; aborting remaining tasks");
        for task in tasks {
            if !task.handle.is_finished() {
                task.handle.abort();
            }
        }
        ShutdownResult::TimedOut { hung_tasks }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
