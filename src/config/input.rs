//! Static input file configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// City names whose lookup records get a rank boost
pub const DEFAULT_TOP_DESTINATIONS: [&str; 5] = [
    "Penang Island",
    "Istanbul",
    "Hong Kong Island",
    "Frankfurt am Main",
    "Dubai",
];

/// Location and layout of the provider dump
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding the extracted JSON files
    pub base_path: PathBuf,
    /// Substring identifying hotel shard files
    pub hotel_shard_filter: String,
    /// Substring identifying property-facility shard files
    pub facility_shard_filter: String,
    /// Exact, case-sensitive city names ranked as top destinations
    pub top_destinations: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            hotel_shard_filter: "Property_".to_string(),
            facility_shard_filter: "PropertyFacility_".to_string(),
            top_destinations: DEFAULT_TOP_DESTINATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
