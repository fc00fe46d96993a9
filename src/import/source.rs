//! Input files, import errors and run statistics

use crate::config::InputConfig;
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during import
///
/// Every variant is fatal: the run stops at the first one.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A join target does not exist
    #[error("Missing {entity} '{key}' referenced by {referenced_by}")]
    MissingReference {
        entity: &'static str,
        key: String,
        referenced_by: String,
    },

    #[error("Failed to read input {}: {source}", .path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", .path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ImportError {
    pub(crate) fn missing(entity: &'static str, key: impl ToString, referenced_by: impl Into<String>) -> Self {
        ImportError::MissingReference {
            entity,
            key: key.to_string(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Whether the error comes from the input data rather than the environment
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ImportError::MissingReference { .. } | ImportError::MalformedInput { .. }
        )
    }
}

/// Fixed-name reference files of the provider dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFile {
    Country,
    Facility,
    FacilityGroup,
    PropertyDestination,
    PropertyCity,
    PropertyAccommodation,
    Chain,
    PropertyChain,
}

impl InputFile {
    /// Every fixed-name file, in the order the pipeline reads them
    pub const ALL: [InputFile; 8] = [
        InputFile::Country,
        InputFile::FacilityGroup,
        InputFile::Facility,
        InputFile::PropertyDestination,
        InputFile::PropertyCity,
        InputFile::PropertyAccommodation,
        InputFile::Chain,
        InputFile::PropertyChain,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            InputFile::Country => "Country.json",
            InputFile::Facility => "Facility.json",
            InputFile::FacilityGroup => "FacilityGroup.json",
            InputFile::PropertyDestination => "PropertyDestination.json",
            InputFile::PropertyCity => "PropertyCity.json",
            InputFile::PropertyAccommodation => "PropertyAccommodation.json",
            InputFile::Chain => "Chain.json",
            InputFile::PropertyChain => "PropertyChain.json",
        }
    }
}

/// Layout of an extracted provider dump on disk
#[derive(Debug, Clone)]
pub struct InputFiles {
    base_path: PathBuf,
    hotel_shard_filter: String,
    facility_shard_filter: String,
}

impl InputFiles {
    /// Dump directory with the default shard filters
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        let defaults = InputConfig::default();
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            hotel_shard_filter: defaults.hotel_shard_filter,
            facility_shard_filter: defaults.facility_shard_filter,
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            base_path: config.base_path.clone(),
            hotel_shard_filter: config.hotel_shard_filter.clone(),
            facility_shard_filter: config.facility_shard_filter.clone(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of a fixed-name file
    pub fn path(&self, file: InputFile) -> PathBuf {
        self.base_path.join(file.file_name())
    }

    /// Hotel shard files in name order
    pub fn hotel_shards(&self) -> Result<Vec<PathBuf>, ImportError> {
        list_shards(&self.base_path, &self.hotel_shard_filter)
    }

    /// Property-facility shard files in name order
    pub fn facility_shards(&self) -> Result<Vec<PathBuf>, ImportError> {
        list_shards(&self.base_path, &self.facility_shard_filter)
    }

    /// Fixed-name files that do not exist
    pub fn missing_files(&self) -> Vec<PathBuf> {
        InputFile::ALL
            .iter()
            .map(|f| self.path(*f))
            .filter(|p| !p.is_file())
            .collect()
    }
}

/// Read a whole file and parse it as a JSON array of records
pub async fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ImportError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ImportError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&bytes).map_err(|source| ImportError::MalformedInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Regular files directly inside `dir` whose name contains `filter`, sorted by name
///
/// Sorting makes shard order independent of the platform's directory listing order.
pub fn list_shards(dir: &Path, filter: &str) -> Result<Vec<PathBuf>, ImportError> {
    let mut shards = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ImportError::InputFile {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().contains(filter) {
            shards.push(entry.into_path());
        }
    }
    Ok(shards)
}

/// Import statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStats {
    /// Countries added (existing ones are skipped)
    pub countries_added: usize,
    /// Facility documents written
    pub facilities_loaded: usize,
    /// City documents written
    pub cities_loaded: usize,
    /// Hotel documents written
    pub hotels_loaded: usize,
    /// Lookup documents written (cities + hotels)
    pub lookups_created: usize,
    /// Hotel shard files processed
    pub hotel_shards: usize,
    /// Property-facility shard files read
    pub facility_shards: usize,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Processing time in seconds
    pub elapsed_seconds: f64,
}

impl ImportStats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            countries_added: 0,
            facilities_loaded: 0,
            cities_loaded: 0,
            hotels_loaded: 0,
            lookups_created: 0,
            hotel_shards: 0,
            facility_shards: 0,
            started_at,
            elapsed_seconds: 0.0,
        }
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n{}", self);
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import Summary")?;
        writeln!(f, "==============")?;
        writeln!(f, "Started at:         {}", self.started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Countries added:    {}", self.countries_added)?;
        writeln!(f, "Facilities loaded:  {}", self.facilities_loaded)?;
        writeln!(f, "Cities loaded:      {}", self.cities_loaded)?;
        writeln!(f, "Hotels loaded:      {} ({} shards)", self.hotels_loaded, self.hotel_shards)?;
        writeln!(f, "Facility shards:    {}", self.facility_shards)?;
        writeln!(f, "Lookup records:     {}", self.lookups_created)?;
        write!(f, "Elapsed time:       {:.1}s", self.elapsed_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderCountry;
    use tempfile::TempDir;

    #[test]
    fn list_shards_filters_by_substring_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in [
            "Property_10.json",
            "Property_2.json",
            "PropertyFacility_1.json",
            "PropertyCity.json",
            "Property_1.json",
        ] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }
        std::fs::create_dir(dir.path().join("Property_old")).unwrap();

        let shards = list_shards(dir.path(), "Property_").unwrap();
        let names: Vec<_> = shards
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["Property_1.json", "Property_10.json", "Property_2.json"]);

        let facility = list_shards(dir.path(), "PropertyFacility_").unwrap();
        assert_eq!(facility.len(), 1);
    }

    #[test]
    fn list_shards_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = list_shards(&dir.path().join("nope"), "Property_");
        assert!(matches!(result, Err(ImportError::InputFile { .. })));
    }

    #[tokio::test]
    async fn read_json_array_reports_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        let missing = read_json_array::<ProviderCountry>(&dir.path().join("Country.json")).await;
        assert!(matches!(missing, Err(ImportError::InputFile { .. })));

        let path = dir.path().join("Country.json");
        std::fs::write(&path, r#"[{"Code": "US""#).unwrap();
        let malformed = read_json_array::<ProviderCountry>(&path).await;
        let err = malformed.unwrap_err();
        assert!(err.is_data_error());
        assert!(err.to_string().contains("Country.json"));
    }

    #[tokio::test]
    async fn read_json_array_parses_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Country.json");
        std::fs::write(&path, r#"[{"Code": "US", "Name": "United States"}]"#).unwrap();
        let countries: Vec<ProviderCountry> = read_json_array(&path).await.unwrap();
        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].code, "US");
    }

    #[test]
    fn missing_files_lists_absent_reference_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Country.json"), "[]").unwrap();
        let files = InputFiles::new(dir.path());
        let missing = files.missing_files();
        assert_eq!(missing.len(), InputFile::ALL.len() - 1);
        assert!(!missing.contains(&files.path(InputFile::Country)));
    }

    #[test]
    fn summary_reports_every_count() {
        let mut stats = ImportStats::new(Utc::now());
        stats.hotels_loaded = 3;
        stats.hotel_shards = 2;
        stats.facility_shards = 4;
        stats.lookups_created = 5;

        let summary = stats.to_string();
        assert!(summary.contains("Hotels loaded:      3 (2 shards)"));
        assert!(summary.contains("Facility shards:    4"));
        assert!(summary.contains("Lookup records:     5"));
    }

    #[test]
    fn missing_reference_message_names_the_join() {
        let err = ImportError::missing("destination", 7, "city 12");
        assert_eq!(err.to_string(), "Missing destination '7' referenced by city 12");
    }
}
