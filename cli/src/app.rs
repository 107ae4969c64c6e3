use crate::output::{print_all, print_one};
use crate::require_workspace;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kuberlab_sdk::Client;

/// List and inspect applications.
#[derive(Debug, Parser)]
pub(crate) struct App {
    #[clap(subcommand)]
    command: AppCommand,
}

#[derive(Debug, Subcommand)]
enum AppCommand {
    /// List the applications of the workspace.
    List {
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
    /// Show one application.
    Get {
        name: String,
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
    /// Show the state of an application and its components.
    Status {
        name: String,
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
}

impl App {
    pub(crate) async fn run(self, client: &Client, workspace: Option<String>) -> Result<()> {
        let workspace = require_workspace(workspace)?;
        match self.command {
            AppCommand::List { json } => {
                let apps = client
                    .apps()
                    .list(&workspace)
                    .await
                    .context(format!("Unable to list applications in '{}'", workspace))?;
                let apps: Vec<_> = apps.into_iter().map(|app| app.into_resource()).collect();
                print_all(&apps, json)
            }
            AppCommand::Get { name, json } => {
                let app = client
                    .apps()
                    .get(&workspace, &name)
                    .await
                    .context(format!("Unable to get application '{}'", name))?;
                print_one(app.resource(), json)
            }
            AppCommand::Status { name, json } => {
                let status = client
                    .apps()
                    .status(&workspace, &name)
                    .await
                    .context(format!("Unable to get status of application '{}'", name))?;
                if let Some(summary) = &status.summary {
                    print_one(summary, json)?;
                }
                print_all(&status.components, json)
            }
        }
    }
}
