//! KnowDesk — enterprise knowledge-base chatbot server.

use clap::{Parser, Subcommand};
use knowdesk_core::config::KnowDeskConfig;

#[derive(Parser)]
#[command(name = "knowdesk", version, about = "Knowledge-base chatbot with keyword retrieval and streaming answers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway (default).
    Serve {
        /// Bind host, overrides config.
        #[arg(long)]
        host: Option<String>,
        /// Bind port, overrides config.
        #[arg(long)]
        port: Option<u16>,
        /// Data directory, overrides config.
        #[arg(long)]
        data_dir: Option<std::path::PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = KnowDeskConfig::load()?;

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None, data_dir: None }) {
        Commands::Serve { host, port, data_dir } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(dir) = data_dir {
                config.storage.data_dir = dir;
            }
            knowdesk_gateway::start(config).await
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
