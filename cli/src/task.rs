use crate::output::{print_all, print_one};
use crate::require_workspace;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kuberlab_sdk::constants::TASK_DEFAULT_TIMEOUT;
use kuberlab_sdk::{Client, WaitOptions};
use log::info;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Run and follow application tasks.
#[derive(Debug, Parser)]
pub(crate) struct Task {
    /// The application the tasks belong to.
    #[clap(long, short = 'a')]
    app: String,
    #[clap(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Parser)]
struct Build {
    /// The task name.
    #[clap(long, short = 't')]
    task: String,
    /// The build id.
    #[clap(long, short = 'b')]
    build: String,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// List the task builds of the application.
    List {
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
    /// Show one build.
    Get {
        #[clap(flatten)]
        build: Build,
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
    /// Start a task declared by the application.
    Run(Run),
    /// List the pods of a build.
    Pods {
        #[clap(flatten)]
        build: Build,
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
    /// Print the log of one pod of a build.
    Logs {
        #[clap(flatten)]
        build: Build,
        /// The pod name, see `task pods`.
        #[clap(long, short = 'p')]
        pod: String,
    },
    /// Delete a build.
    Delete {
        #[clap(flatten)]
        build: Build,
    },
}

#[derive(Debug, Parser)]
struct Run {
    /// The task name from the application's configuration.
    task: String,
    /// Wait for the build to complete.
    #[clap(long)]
    wait: bool,
    /// Print the build's state while waiting. Implies `--wait`.
    #[clap(long)]
    watch: bool,
    /// How long to wait, in seconds.
    #[clap(long, default_value_t = TASK_DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
    /// Start a new build even if one is running.
    #[clap(long)]
    restart: bool,
    /// Output the results in JSON format.
    #[clap(long)]
    json: bool,
}

impl Task {
    pub(crate) async fn run(self, client: &Client, workspace: Option<String>) -> Result<()> {
        let workspace = require_workspace(workspace)?;
        let tasks = client.app_tasks();
        let app = self.app;
        match self.command {
            TaskCommand::List { json } => {
                let list = tasks
                    .list(&workspace, &app)
                    .await
                    .context(format!("Unable to list tasks of '{}'", app))?;
                print_all(&list, json)
            }
            TaskCommand::Get { build, json } => {
                let task = tasks
                    .get(&workspace, &app, &build.task, &build.build)
                    .await
                    .context(format!(
                        "Unable to get build '{}' of '{}'",
                        build.build, build.task
                    ))?;
                print_one(&task, json)
            }
            TaskCommand::Run(run) => run.run(client, &workspace, &app).await,
            TaskCommand::Pods { build, json } => {
                let pods = tasks
                    .get_pods(&workspace, &app, &build.task, &build.build)
                    .await
                    .context(format!("Unable to list pods of build '{}'", build.build))?;
                print_all(&pods, json)
            }
            TaskCommand::Logs { build, pod } => {
                let logs = tasks
                    .get_pod_logs(&workspace, &app, &build.task, &build.build, &pod)
                    .await
                    .context(format!("Unable to get logs of pod '{}'", pod))?;
                print!("{}", logs.unwrap_or_default());
                Ok(())
            }
            TaskCommand::Delete { build } => {
                tasks
                    .delete(&workspace, &app, &build.task, &build.build)
                    .await
                    .context(format!("Unable to delete build '{}'", build.build))?;
                info!("Deleted build '{}' of task '{}'", build.build, build.task);
                Ok(())
            }
        }
    }
}

impl Run {
    async fn run(self, client: &Client, workspace: &str, app: &str) -> Result<()> {
        let declared = client
            .apps()
            .get(workspace, app)
            .await
            .context(format!("Unable to get application '{}'", app))?
            .config_task(&self.task)
            .context(format!("Unable to find task '{}' in '{}'", self.task, app))?;

        let mut controller = client.task_controller(declared);
        let started = if self.restart {
            controller.restart().await
        } else {
            controller.start().await
        };
        started.context(format!("Unable to start task '{}'", self.task))?;

        if self.wait || self.watch {
            let cancellation = CancellationToken::new();
            let trigger = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    trigger.cancel();
                }
            });
            let options = WaitOptions::with_timeout(Duration::from_secs(self.timeout))
                .cancel_on(cancellation);
            let watch = self.watch;
            controller
                .wait(&options, |task| {
                    if watch {
                        println!("{}", task);
                    }
                    Ok(())
                })
                .await
                .context(format!("Task '{}' did not complete", self.task))?;
        }
        print_one(controller.task(), self.json)
    }
}
