use anyhow::{anyhow, Result};
use parto_import::{
    config::Config,
    import::{ImportError, ImporterBuilder},
    store::{ArangoStore, DocumentStore, MemoryStore},
};
use std::sync::Arc;
use tracing::info;

pub async fn run_import(config: Config, dry_run: bool, quiet: bool) -> Result<()> {
    let store: Arc<dyn DocumentStore> = if dry_run {
        info!("Dry run: importing into an in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        info!(
            "Connecting to {} (database {})",
            config.database.endpoint, config.database.database
        );
        Arc::new(
            ArangoStore::new(&config.database)
                .map_err(|e| anyhow!("Failed to create database client: {}", e))?,
        )
    };

    let importer = ImporterBuilder::new(store)
        .with_input_config(config.input.clone())
        .with_quiet(quiet)
        .build()?;

    let stats = importer.run().await.map_err(describe_failure)?;

    if !quiet {
        stats.print_summary();
        if dry_run {
            println!("\nDry run: nothing was written to the database.");
        }
    }

    Ok(())
}

/// Tell bad input apart from configuration and database problems
fn describe_failure(err: ImportError) -> anyhow::Error {
    let hint = if err.is_data_error() {
        "Import aborted: the input files are inconsistent or malformed"
    } else if matches!(err, ImportError::Config(_)) {
        "Import aborted: check the configuration file"
    } else {
        "Import aborted: input directory or database unavailable"
    };
    anyhow::Error::new(err).context(hint)
}
