use anyhow::Context;
use clap::Parser;
use nf_core::config::split_list;
use nf_core::FeedConfig;
use nf_feed::cli::{handle_command, FeedArgs, FeedCommands};
use nf_feed::{init_logging, FeedAssembler, FeedService};
use nf_web::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Paginated news feed with source filtering", long_about = None)]
pub struct Cli {
    /// TOML config file; environment variables and flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Storage backend for the last batch and favorites: memory or file
    #[arg(long, default_value = "file", global = true)]
    storage: String,
    #[arg(long, global = true)]
    state_path: Option<PathBuf>,
    /// Comma separated country codes for top headlines
    #[arg(long, global = true)]
    countries: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<u32>,
    /// Extra source names to filter out, comma separated
    #[arg(long, global = true)]
    block: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Feed(FeedCommands),
    /// Serve the feed over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<FeedConfig> {
    let mut config = match &cli.config {
        Some(path) => FeedConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FeedConfig::default(),
    };
    config.apply_env();

    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(countries) = &cli.countries {
        config.countries = split_list(countries);
    }
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }
    if let Some(block) = &cli.block {
        config.blacklist.extend(split_list(block));
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = init_logging().with_prefix("[NF]");
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let storage = nf_storage::create_storage(&cli.storage, cli.state_path.as_deref())?;
    logger.info(&format!("💾 Storage initialized (using {})", cli.storage));

    match cli.command {
        Commands::Feed(command) => {
            handle_command(FeedArgs { command }, &config, storage).await?;
        }
        Commands::Serve { addr } => {
            let service = FeedService::new(FeedAssembler::from_config(&config)?, storage, config.request());
            logger.info(&format!("📰 Headline source: {}", service.source_name()));
            nf_web::serve(AppState { service: Arc::new(service) }, addr).await?;
        }
    }

    Ok(())
}
