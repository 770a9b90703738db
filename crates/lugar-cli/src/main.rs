mod categories;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lugar")]
#[command(about = "Search local businesses from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch businesses from the backend and print the filtered, ranked list
    Search(search::SearchArgs),
    /// List the category styles in effect
    Categories {
        /// YAML file overriding the built-in category table
        #[arg(long, env = "LUGAR_CATEGORIES_PATH")]
        file: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            let config = lugar_core::load_app_config_from_env()?;
            init_tracing(&config.log_level)?;
            tracing::debug!(?config, "loaded configuration");
            search::run_search(&config, &args).await?;
        }
        Commands::Categories { file, json } => {
            init_tracing("warn")?;
            categories::run_categories(file.as_deref(), json)?;
        }
    }

    Ok(())
}
