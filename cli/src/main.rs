/*!

This is the command line interface for the Kuberlab and Dealer machine learning platforms.

!*/

mod app;
mod chart;
mod output;
mod task;
mod workspace;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use kuberlab_sdk::clients::{Credentials, TlsOptions};
use kuberlab_sdk::{ApiVariant, Client, ClientConfig};
use log::LevelFilter;
use std::path::PathBuf;

/// The command line interface for Kuberlab workspaces, applications and tasks.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// The API base URL. Defaults to the URL of the selected deployment.
    #[clap(long, env = "KUBERLAB_URL")]
    url: Option<String>,
    /// An API token. Takes precedence over `--username` and `--password`.
    #[clap(long, env = "KUBERLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Login name or email.
    #[clap(long, env = "KUBERLAB_USERNAME")]
    username: Option<String>,
    #[clap(long, env = "KUBERLAB_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// A PEM bundle used to verify the server certificate.
    #[clap(long, env = "KUBERLAB_CACERT")]
    cacert: Option<PathBuf>,
    /// Do not verify the server certificate.
    #[clap(long, env = "KUBERLAB_INSECURE")]
    insecure: bool,
    /// Talk to a Dealer deployment instead of Kuberlab.
    #[clap(long)]
    dealer: bool,
    /// The workspace that commands operate in.
    #[clap(long, short = 'w', env = "KUBERLAB_WORKSPACE")]
    workspace: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// List and inspect workspaces.
    Workspace(workspace::Workspace),
    /// List and inspect applications.
    App(app::App),
    /// Run and follow application tasks.
    Task(task::Task),
    /// Browse the chart catalog.
    Chart(chart::Chart),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = client_config(&args);
    let client = Client::new(config)
        .await
        .context("Unable to create client")?;
    let workspace = args.workspace;
    match args.command {
        Command::Workspace(command) => command.run(&client).await,
        Command::App(command) => command.run(&client, workspace).await,
        Command::Task(command) => command.run(&client, workspace).await,
        Command::Chart(command) => command.run(&client, workspace).await,
    }
}

fn client_config(args: &Args) -> ClientConfig {
    let variant = if args.dealer {
        ApiVariant::Dealer
    } else {
        ApiVariant::Kuberlab
    };
    let mut config = ClientConfig::new(variant).tls(TlsOptions {
        insecure: args.insecure,
        cacert: args.cacert.clone(),
        ..Default::default()
    });
    if let Some(url) = &args.url {
        config = config.base_url(url);
    }
    if args.token.is_some() || args.username.is_some() || args.password.is_some() {
        config = config.credentials(Credentials {
            username: args.username.clone(),
            password: args.password.clone(),
            token: args.token.clone(),
        });
    }
    config
}

/// The workspace given with `--workspace`, required by most commands.
pub(crate) fn require_workspace(workspace: Option<String>) -> Result<String> {
    workspace
        .filter(|w| !w.is_empty())
        .context("A workspace is required, use --workspace or KUBERLAB_WORKSPACE")
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use the level for this binary and the sdk only.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("kuberlab_sdk"), level)
                .init();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn global_flags() {
        let args = Args::try_parse_from([
            "klab",
            "--dealer",
            "--url",
            "http://localhost:8082/api/v0.2",
            "--token",
            "abc",
            "-w",
            "demo",
            "workspace",
            "list",
        ])
        .unwrap();
        assert_eq!(args.workspace.as_deref(), Some("demo"));
        let config = client_config(&args);
        assert_eq!(config.variant, ApiVariant::Dealer);
        assert_eq!(config.url(), "http://localhost:8082/api/v0.2");
        assert_eq!(
            config.credentials.and_then(|c| c.token).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn anonymous_by_default() {
        let args = Args::try_parse_from(["klab", "chart", "catalog"]).unwrap();
        let config = client_config(&args);
        assert!(config.credentials.is_none());
        assert_eq!(config.variant, ApiVariant::Kuberlab);
        assert_eq!(args.log_level, LevelFilter::Info);
    }

    #[test]
    fn subcommand_required() {
        assert!(Args::try_parse_from(["klab"]).is_err());
        assert!(Args::try_parse_from(["klab", "workspace", "remove"]).is_err());
    }

    #[test]
    fn workspace_is_checked() {
        assert!(require_workspace(None).is_err());
        assert!(require_workspace(Some(String::new())).is_err());
        assert_eq!(require_workspace(Some("demo".into())).unwrap(), "demo");
    }
}
