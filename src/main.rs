use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use attractions_catalog::config::Config;
use attractions_catalog::logging;
use attractions_catalog::server::start_server;
use attractions_catalog::storage::Storage;

#[cfg(feature = "db")]
use attractions_catalog::storage::DatabaseStorage;
#[cfg(not(feature = "db"))]
use attractions_catalog::storage::InMemoryStorage;

#[derive(Parser)]
#[command(name = "attractions-catalog")]
#[command(about = "REST catalog service for attractions, localities and assistance services")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind; overrides the config.toml value
        #[arg(long)]
        port: Option<u16>,
    },
}

async fn build_storage() -> Result<Arc<dyn Storage>, Box<dyn std::error::Error>> {
    #[cfg(feature = "db")]
    {
        let storage = DatabaseStorage::new().await?;
        info!("Using libSQL-backed storage");
        Ok(Arc::new(storage))
    }
    #[cfg(not(feature = "db"))]
    {
        info!("Using in-memory storage");
        Ok(Arc::new(InMemoryStorage::new()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before anything reads database credentials
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config::load()?;
            let port = port.unwrap_or(config.server.port);

            let storage = build_storage().await?;
            start_server(storage, port).await?;
        }
    }

    Ok(())
}
