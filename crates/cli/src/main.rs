//! gridstudy CLI
//!
//! Inspect and synchronize the variant commands of a study.

use anyhow::Context;
use clap::{Parser, Subcommand};
use gridstudy_variants::{ClientConfig, ConfigError, HttpCommandStore, config};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "gridstudy")]
#[command(about = "Variant study command tooling", long_about = None)]
struct Cli {
    /// Backend base URL (overrides GRIDSTUDY_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides GRIDSTUDY_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the remote command list
    List(commands::list::ListArgs),
    /// Export the remote command list as JSON
    Export(commands::export::ExportArgs),
    /// Converge the remote command list to a JSON file
    Sync(commands::sync::SyncArgs),
}

impl Cli {
    /// Environment settings with command-line overrides applied.
    fn client_config<F>(&self, lookup: F) -> Result<ClientConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::from_lookup(lookup)?;
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url.clone());
        }
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli
        .client_config(|key| std::env::var(key).ok())
        .context("invalid environment configuration")?;
    gridstudy_observability::init_with(config.log_format, "warn");
    if config.uses_default_api_url() {
        tracing::warn!(
            "{} not set; using {}",
            config::ENV_API_URL,
            config::DEFAULT_API_URL
        );
    }

    let store = HttpCommandStore::new(&config)?;
    tracing::debug!(api_url = %store.api_url(), "using backend");

    match cli.command {
        Commands::List(args) => commands::list::execute(&store, args).await,
        Commands::Export(args) => commands::export::execute(&store, args).await,
        Commands::Sync(args) => commands::sync::execute(&store, args).await,
    }
}
