use crate::output::print_all;
use crate::require_workspace;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kuberlab_sdk::{CatalogQuery, Client};

/// Browse the chart catalog.
#[derive(Debug, Parser)]
pub(crate) struct Chart {
    #[clap(subcommand)]
    command: ChartCommand,
}

#[derive(Debug, Subcommand)]
enum ChartCommand {
    /// Search the public chart catalog.
    Catalog(Filters),
    /// List the charts of the workspace.
    List(Filters),
}

#[derive(Debug, Parser)]
struct Filters {
    /// Only charts matching this text.
    #[clap(long)]
    search: Option<String>,
    /// Only charts of this type, e.g. `mlapp-v2`.
    #[clap(long = "type")]
    chart_type: Option<String>,
    #[clap(long)]
    page: Option<u32>,
    #[clap(long)]
    limit: Option<u32>,
    /// Output the results in JSON format.
    #[clap(long)]
    json: bool,
}

impl Filters {
    fn query(&self) -> CatalogQuery {
        CatalogQuery {
            search: self.search.clone(),
            chart_type: self.chart_type.clone(),
            page: self.page,
            limit: self.limit,
        }
    }
}

impl Chart {
    pub(crate) async fn run(self, client: &Client, workspace: Option<String>) -> Result<()> {
        match self.command {
            ChartCommand::Catalog(filters) => {
                let charts = client
                    .charts()
                    .catalog(&filters.query())
                    .await
                    .context("Unable to search the chart catalog")?;
                print_all(&charts, filters.json)
            }
            ChartCommand::List(filters) => {
                let workspace = require_workspace(workspace)?;
                let charts = client
                    .charts()
                    .list(&workspace, &filters.query())
                    .await
                    .context(format!("Unable to list charts in '{}'", workspace))?;
                print_all(&charts, filters.json)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn filters_become_query() {
        let chart = Chart::try_parse_from([
            "chart", "catalog", "--search", "tf", "--type", "mlapp-v2", "--limit", "5",
        ])
        .unwrap();
        match chart.command {
            ChartCommand::Catalog(filters) => assert_eq!(
                filters.query().to_query_string(),
                "?search=tf&type=mlapp-v2&limit=5"
            ),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
