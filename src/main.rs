mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

use config::AppConfig;
use infrastructure::{AppContainer, create_connection_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;

    let db_pool = create_connection_pool(&config.database_url)?;
    run_migrations(&db_pool)?;

    let container = AppContainer::new(&config, db_pool)?;
    let server = container.into_server(&config);

    tracing::info!("Starting processo-rag on port {}", config.port);
    server.run().await
}
