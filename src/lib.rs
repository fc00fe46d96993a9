//! parto-import: load the Parto static hotel content dump into ArangoDB
//!
//! - Four primary collections: `Country`, `PartoHotelFacility`,
//!   `PartoHotelCity`, `PartoHotel`
//! - One search projection, `HotelLookup`, with a full-text indexed field
//! - Strict stage order with fail-fast referential checks

pub mod config;
pub mod import;
pub mod store;
pub mod types;

pub use config::Config;
pub use types::*;
