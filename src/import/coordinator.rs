//! Importer that runs the pipeline stages in order

use super::city::{load_cities, TopDestinations};
use super::country::load_countries;
use super::facility::load_facilities;
use super::hotel::load_hotels;
use super::sequence::LookupKeys;
use super::source::{ImportError, ImportStats, InputFiles};
use crate::config::{InputConfig, DEFAULT_TOP_DESTINATIONS};
use crate::store::DocumentStore;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runs Country → Facility → City → Hotel against one store
pub struct Importer {
    store: Arc<dyn DocumentStore>,
    files: InputFiles,
    top_destinations: TopDestinations,
    quiet: bool,
}

impl Importer {
    pub fn new(store: Arc<dyn DocumentStore>, files: InputFiles) -> Self {
        Self {
            store,
            files,
            top_destinations: TopDestinations::new(DEFAULT_TOP_DESTINATIONS),
            quiet: false,
        }
    }

    /// Set quiet mode (no progress output)
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_top_destinations(mut self, top: TopDestinations) -> Self {
        self.top_destinations = top;
        self
    }

    pub fn files(&self) -> &InputFiles {
        &self.files
    }

    /// Run the whole pipeline, stopping at the first error
    pub async fn run(&self) -> Result<ImportStats, ImportError> {
        let started = Instant::now();
        let mut stats = ImportStats::new(Utc::now());
        let store = self.store.as_ref();
        info!(
            "Starting import from {} into {}",
            self.files.base_path().display(),
            store.name()
        );

        info!("ADDING COUNTRIES IN-PROGRESS");
        stats.countries_added = load_countries(store, &self.files).await?;
        info!("ADDING COUNTRIES FINISHED");

        info!("ADDING FACILITIES IN-PROGRESS");
        stats.facilities_loaded = load_facilities(store, &self.files).await?;
        info!("ADDING FACILITIES FINISHED");

        let mut keys = LookupKeys::new();

        info!("ADDING CITIES IN-PROGRESS");
        stats.cities_loaded = load_cities(store, &self.files, &mut keys, &self.top_destinations).await?;
        info!("ADDING CITIES FINISHED");

        info!("ADDING HOTELS IN-PROGRESS");
        let hotels = load_hotels(store, &self.files, &mut keys, self.quiet).await?;
        info!("ADDING HOTELS FINISHED");

        stats.hotels_loaded = hotels.hotels;
        stats.hotel_shards = hotels.shards;
        stats.facility_shards = hotels.facility_shards;
        stats.lookups_created = stats.cities_loaded + hotels.lookups;
        stats.elapsed_seconds = started.elapsed().as_secs_f64();

        info!(
            "{} lookup keys issued, {} lookup records written",
            keys.issued(),
            stats.lookups_created
        );
        info!("Import finished in {:.1}s", stats.elapsed_seconds);
        Ok(stats)
    }
}

/// Builder for [`Importer`]
pub struct ImporterBuilder {
    store: Arc<dyn DocumentStore>,
    input: Option<InputConfig>,
    top_destinations: Option<TopDestinations>,
    quiet: bool,
}

impl ImporterBuilder {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            input: None,
            top_destinations: None,
            quiet: false,
        }
    }

    /// Read the dump from `base_path` with default shard filters
    pub fn with_input(mut self, base_path: impl AsRef<Path>) -> Self {
        let mut input = self.input.take().unwrap_or_default();
        input.base_path = base_path.as_ref().to_path_buf();
        self.input = Some(input);
        self
    }

    /// Set the whole input section
    pub fn with_input_config(mut self, input: InputConfig) -> Self {
        self.input = Some(input);
        self
    }

    /// Override the top destination list of the input section
    pub fn with_top_destinations(mut self, top: TopDestinations) -> Self {
        self.top_destinations = Some(top);
        self
    }

    /// Set quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn build(self) -> Result<Importer, ImportError> {
        let input = self.input.ok_or_else(|| {
            ImportError::Config("Input directory is required. Call with_input() first.".into())
        })?;

        let top = self
            .top_destinations
            .unwrap_or_else(|| TopDestinations::new(input.top_destinations.iter().cloned()));

        Ok(Importer::new(self.store, InputFiles::from_config(&input))
            .with_top_destinations(top)
            .with_quiet(self.quiet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    #[test]
    fn builder_requires_input() {
        let result = ImporterBuilder::new(Arc::new(MemoryStore::new()))
            .with_quiet(true)
            .build();

        match result {
            Err(ImportError::Config(_)) => (),
            _ => panic!("Expected ImportError::Config"),
        }
    }

    #[test]
    fn builder_uses_input_directory() {
        let dir = TempDir::new().unwrap();
        let importer = ImporterBuilder::new(Arc::new(MemoryStore::new()))
            .with_input(dir.path())
            .build()
            .unwrap();
        assert_eq!(importer.files().base_path(), dir.path());
    }

    #[tokio::test]
    async fn run_fails_on_missing_input() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let importer = ImporterBuilder::new(store.clone())
            .with_input(dir.path())
            .with_quiet(true)
            .build()
            .unwrap();

        let err = importer.run().await.unwrap_err();
        assert!(matches!(err, ImportError::InputFile { .. }));
        assert!(!store.has_collection("Country"));
    }
}
