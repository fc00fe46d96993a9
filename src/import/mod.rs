//! Provider dump import pipeline
//!
//! Loads the Parto static content dump (a directory of JSON files) into the
//! document store as four primary collections and one search projection.
//!
//! # Example Usage
//!
//! ```no_run
//! use parto_import::import::ImporterBuilder;
//! use parto_import::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let importer = ImporterBuilder::new(Arc::new(MemoryStore::new()))
//!     .with_input("/data/parto")
//!     .with_quiet(true)
//!     .build()?;
//!
//! let stats = importer.run().await?;
//! println!("Imported {} hotels", stats.hotels_loaded);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                             Importer                                │
//! │               (stage order, lookup keys, timing)                    │
//! └─────────────────────────────────────────────────────────────────────┘
//!          │              │                │                  │
//!          ▼              ▼                ▼                  ▼
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────────┐
//! │   Country    │ │   Facility   │ │     City     │ │      Hotel       │
//! │  (additive)  │ │  (reload)    │ │  (reload +   │ │ (reload per      │
//! │              │ │              │ │   lookups)   │ │  shard + lookups)│
//! └──────────────┘ └──────────────┘ └──────────────┘ └──────────────────┘
//!                                                             │
//!                                                      chain / facility
//!                                                         maps
//!          │              │                │                  │
//!          ▼              ▼                ▼                  ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      DocumentStore Trait                            │
//! │                 (ArangoStore, MemoryStore)                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod city;
pub mod coordinator;
pub mod country;
pub mod facility;
pub mod hotel;
pub mod maps;
pub mod progress;
pub mod sequence;
pub mod source;

// Re-export main types
pub use city::TopDestinations;
pub use coordinator::{Importer, ImporterBuilder};
pub use hotel::HotelStats;
pub use progress::ShardProgress;
pub use sequence::LookupKeys;
pub use source::{ImportError, ImportStats, InputFile, InputFiles};

use crate::store::DocumentStore;
use tracing::info;

/// Create a collection if needed and empty it
pub(crate) async fn reset_collection(store: &dyn DocumentStore, name: &str) -> Result<(), ImportError> {
    if store.ensure_collection(name).await? {
        info!("{} collection created", name);
    }
    store.truncate(name).await?;
    info!("{} collection truncated", name);
    Ok(())
}
