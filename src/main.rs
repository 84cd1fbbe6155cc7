use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ttlbin::config::Config;
use ttlbin::{commands, App};

/// Share text snippets that expire by time or by view count.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Port to listen on, overriding the configuration
        #[arg(short, long, env = "PASTEBIN_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::load(&args.config)?;

    match args.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            info!(
                "starting ttlbin v{}: storage={:?}",
                env!("CARGO_PKG_VERSION"),
                config.storage.kind
            );
            let app = App::connect(config).await?;
            commands::serve::run(app).await
        }
    }
}
