use crate::output::{print_all, print_one};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kuberlab_sdk::Client;

/// List and inspect workspaces.
#[derive(Debug, Parser)]
pub(crate) struct Workspace {
    #[clap(subcommand)]
    command: WorkspaceCommand,
}

#[derive(Debug, Subcommand)]
enum WorkspaceCommand {
    /// List the workspaces you have access to.
    List {
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
    /// Show one workspace.
    Get {
        /// The workspace name.
        name: String,
        /// Output the results in JSON format.
        #[clap(long)]
        json: bool,
    },
}

impl Workspace {
    pub(crate) async fn run(self, client: &Client) -> Result<()> {
        match self.command {
            WorkspaceCommand::List { json } => {
                let workspaces = client
                    .workspaces()
                    .list()
                    .await
                    .context("Unable to list workspaces")?;
                print_all(&workspaces, json)
            }
            WorkspaceCommand::Get { name, json } => {
                let workspace = client
                    .workspaces()
                    .get(&name)
                    .await
                    .context(format!("Unable to get workspace '{}'", name))?;
                print_one(&workspace, json)
            }
        }
    }
}
