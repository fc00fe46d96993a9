use anyhow::{anyhow, Result};
use parto_import::{
    config::Config,
    store::{ArangoStore, DocumentStore, StoreError},
    types::ALL_COLLECTIONS,
};
use tracing::info;

pub async fn show_stats(config: Config) -> Result<()> {
    info!("Loading collection statistics...");

    let store = ArangoStore::new(&config.database)
        .map_err(|e| anyhow!("Failed to create database client: {}", e))?;

    println!("\nparto-import Statistics:");
    println!("========================");
    println!("Endpoint: {}", config.database.endpoint);
    println!("Database: {}", config.database.database);

    for name in ALL_COLLECTIONS {
        match store.count(name).await {
            Ok(count) => println!("{:<20} {}", name, count),
            Err(StoreError::CollectionNotFound(_)) => println!("{:<20} (missing)", name),
            Err(e) => return Err(anyhow!("Failed to count {}: {}", name, e)),
        }
    }

    Ok(())
}
