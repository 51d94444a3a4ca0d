use std::process;

use clap::{Parser, Subcommand};
use edgeapi_cli::config::{load_dotenv, HostConfig};
use edgeapi_cli::host;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edgeapi")]
#[command(about = "Run an edgeapi worker on a local host")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the worker over HTTP
    Dev {
        /// Port to listen on (overrides PORT)
        #[arg(long, value_parser = edgeapi_cli::config::parse_port)]
        port: Option<u16>,
        /// Expose /cdn-cgi/handler/scheduled for firing cron handlers
        #[arg(long)]
        test_scheduled: bool,
    },
    /// Fire one scheduled event and exit
    Scheduled {
        /// Cron pattern delivered to the worker
        #[arg(long)]
        cron: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = HostConfig::from_env()?;

    match command {
        Commands::Dev {
            port,
            test_scheduled,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            host::serve(config, test_scheduled).await
        }
        Commands::Scheduled { cron } => host::run_scheduled(config, &cron).await,
    }
}
