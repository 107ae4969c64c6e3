use super::app_task::AppTask;
use crate::constants::{TASK_DEFAULT_TIMEOUT, TASK_POLL_INTERVAL};
use crate::error::{self, Result};
use crate::managers::AppTaskManager;
use crate::Resource;
use log::{info, warn};
use serde_json::Value;
use std::future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// What a tick callback returns. Errors are logged and otherwise ignored.
pub type TickResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// How long [`TaskController::wait`] polls and what cancels it. Polls are three seconds apart.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Measured from the start of the wait.
    pub timeout: Duration,
    /// Fixed at `TASK_POLL_INTERVAL`.
    pub(crate) poll_interval: Duration,
    /// Cancelling the token ends the wait with `Error::Cancelled`.
    pub cancellation: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: TASK_DEFAULT_TIMEOUT,
            poll_interval: TASK_POLL_INTERVAL,
            cancellation: None,
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Drives one [`AppTask`] through its lifecycle: start, refresh and wait for completion.
///
/// The controller owns the task snapshot and updates it in place; only the execution fields
/// ever change.
pub struct TaskController<'a> {
    manager: &'a AppTaskManager,
    task: AppTask,
}

impl<'a> TaskController<'a> {
    pub fn new(manager: &'a AppTaskManager, task: AppTask) -> Self {
        Self { manager, task }
    }

    pub fn task(&self) -> &AppTask {
        &self.task
    }

    pub fn into_task(self) -> AppTask {
        self.task
    }

    fn build(&self) -> Result<&str> {
        match self.task.build.as_deref() {
            Some(build) => Ok(build),
            None => error::NoBuildSnafu {
                task: &self.task.name,
            }
            .fail(),
        }
    }

    /// The body sent when a build is started.
    fn start_body(&self) -> Result<Option<Value>> {
        if self.manager.variant().starts_tasks_with_app_config() {
            if let Some(app_config) = self.task.parsed_app_config()? {
                return Ok(Some(app_config));
            }
        }
        self.task.parsed_config()
    }

    /// Start a build of a task that is not running. A task with a build that has not completed
    /// is rejected with `Error::AlreadyRunning`; use [`restart`] to start a new build regardless.
    ///
    /// [`restart`]: TaskController::restart
    pub async fn start(&mut self) -> Result<&AppTask> {
        if let (Some(build), false) = (&self.task.build, self.task.completed) {
            return error::AlreadyRunningSnafu {
                task: &self.task.name,
                build,
            }
            .fail();
        }
        self.restart().await
    }

    /// Start a new build unconditionally. The server assigns a new build id.
    pub async fn restart(&mut self) -> Result<&AppTask> {
        let body = self.start_body()?;
        let started = self
            .manager
            .create(
                &self.task.workspace,
                &self.task.app,
                &self.task.name,
                body.as_ref(),
            )
            .await?;
        self.task.merge_execution(started);
        info!(
            "Started task '{}' of '{}/{}' as build {}",
            self.task.name,
            self.task.workspace,
            self.task.app,
            self.task.build.as_deref().unwrap_or("None")
        );
        Ok(&self.task)
    }

    /// Fetch the current state of the build.
    pub async fn refresh(&mut self) -> Result<&AppTask> {
        let build = self.build()?.to_string();
        let current = self
            .manager
            .get(
                &self.task.workspace,
                &self.task.app,
                &self.task.name,
                &build,
            )
            .await?;
        let previous = self.task.status.clone();
        self.task.merge_execution(current);
        if self.task.status != previous {
            info!(
                "Task '{}' build {} is {}",
                self.task.name, build, self.task.status
            );
        }
        Ok(&self.task)
    }

    /// Poll until the build completes. `tick` sees the task before every poll; its errors and
    /// panics are logged and do not end the wait.
    pub async fn wait<F>(&mut self, options: &WaitOptions, mut tick: F) -> Result<&AppTask>
    where
        F: FnMut(&AppTask) -> TickResult,
    {
        self.build()?;
        // A timeout too large for an `Instant` never expires.
        let deadline = Instant::now().checked_add(options.timeout);
        let cancellation = options.cancellation.clone().unwrap_or_default();
        let task = self.task.name.clone();

        tokio::select! {
            biased;
            result = self.poll_until_completed(options.poll_interval, &mut tick) => result?,
            _ = expire(deadline) => {
                return error::TimeoutSnafu {
                    task,
                    seconds: options.timeout.as_secs(),
                }
                .fail();
            }
            _ = cancellation.cancelled() => {
                return error::CancelledSnafu { task }.fail();
            }
        }
        Ok(&self.task)
    }

    async fn poll_until_completed<F>(&mut self, interval: Duration, tick: &mut F) -> Result<()>
    where
        F: FnMut(&AppTask) -> TickResult,
    {
        while !self.task.completed {
            notify(tick, &self.task);
            time::sleep(interval).await;
            self.refresh().await?;
        }
        Ok(())
    }

    /// Start the task and wait for it with the default options.
    pub async fn run(&mut self) -> Result<&AppTask> {
        self.start().await?;
        self.wait(&WaitOptions::default(), |_| Ok(())).await
    }

    pub async fn pods(&self) -> Result<Vec<Resource>> {
        let build = self.build()?;
        self.manager
            .get_pods(&self.task.workspace, &self.task.app, &self.task.name, build)
            .await
    }

    pub async fn logs(&self, pod: &str) -> Result<Option<String>> {
        let build = self.build()?;
        self.manager
            .get_pod_logs(
                &self.task.workspace,
                &self.task.app,
                &self.task.name,
                build,
                pod,
            )
            .await
    }
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

fn notify<F>(tick: &mut F, task: &AppTask)
where
    F: FnMut(&AppTask) -> TickResult,
{
    match panic::catch_unwind(AssertUnwindSafe(|| tick(task))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Tick callback for task '{}' failed: {}", task.name, e),
        Err(_) => warn!("Tick callback for task '{}' panicked", task.name),
    }
}
