//! City stage: reload provider cities and their lookup records

use super::reset_collection;
use super::sequence::LookupKeys;
use super::source::{read_json_array, ImportError, InputFile, InputFiles};
use crate::store::{fetch_all, to_documents, Batch, DocumentStore};
use crate::types::{
    City, Country, LookupKind, LookupRecord, ProviderCity, ProviderDestination, ProviderRef,
    CITY_COLLECTION, COUNTRY_COLLECTION, LOOKUP_COLLECTION,
};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Exact, case-sensitive set of city names ranked as top destinations
#[derive(Debug, Clone, Default)]
pub struct TopDestinations(HashSet<String>);

impl TopDestinations {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, city_name: &str) -> bool {
        self.0.contains(city_name)
    }

    /// Lookup rank for a city name
    pub fn rate(&self, city_name: &str) -> u8 {
        u8::from(self.contains(city_name))
    }
}

/// Lookup record for a stored city
pub fn city_lookup(city: &City, country: &Country, rate: u8) -> LookupRecord {
    LookupRecord {
        key: city.lookup_key.clone(),
        kind: LookupKind::City,
        name: format!("{}, {}", city.name, country.name),
        fulltext: format!(
            "{} {} {} {}",
            city.name, city.destination, country.name, country.key
        ),
        rate,
        providers: vec![ProviderRef::parto(CITY_COLLECTION, &city.key)],
    }
}

/// Join cities to destinations and countries, issuing one lookup key per city
pub fn build_cities(
    cities: &[ProviderCity],
    destinations: &[ProviderDestination],
    countries: &[Country],
    keys: &mut LookupKeys,
    top: &TopDestinations,
) -> Result<(Vec<City>, Vec<LookupRecord>), ImportError> {
    let destinations: HashMap<_, _> = destinations.iter().map(|d| (d.id, d)).collect();
    let countries: HashMap<_, _> = countries.iter().map(|c| (c.key.as_str(), c)).collect();

    let mut stored = Vec::with_capacity(cities.len());
    let mut lookups = Vec::with_capacity(cities.len());

    for city in cities {
        let destination = destinations
            .get(&city.property_destination_id)
            .ok_or_else(|| {
                ImportError::missing(
                    "destination",
                    city.property_destination_id,
                    format!("city {}", city.id),
                )
            })?;
        let country = countries
            .get(destination.country_id.as_str())
            .ok_or_else(|| {
                ImportError::missing(
                    "country",
                    &destination.country_id,
                    format!("destination {}", destination.id),
                )
            })?;

        let record = City {
            key: city.id.to_string(),
            name: city.name.clone(),
            destination: destination.name.clone(),
            country_id: country.key.clone(),
            lookup_key: keys.next_key(),
        };
        lookups.push(city_lookup(&record, country, top.rate(&city.name)));
        stored.push(record);
    }

    Ok((stored, lookups))
}

/// Truncate and reload `PartoHotelCity`, and restart `HotelLookup` with city records
pub async fn load_cities(
    store: &dyn DocumentStore,
    files: &InputFiles,
    keys: &mut LookupKeys,
    top: &TopDestinations,
) -> Result<usize, ImportError> {
    let destinations: Vec<ProviderDestination> =
        read_json_array(&files.path(InputFile::PropertyDestination)).await?;
    let cities: Vec<ProviderCity> = read_json_array(&files.path(InputFile::PropertyCity)).await?;

    reset_collection(store, CITY_COLLECTION).await?;
    reset_collection(store, LOOKUP_COLLECTION).await?;

    let countries: Vec<Country> = fetch_all(store, COUNTRY_COLLECTION).await?;
    let (stored, lookups) = build_cities(&cities, &destinations, &countries, keys, top)?;

    info!("Adding all cities to {} and {} collections", CITY_COLLECTION, LOOKUP_COLLECTION);
    let city_docs = to_documents(&stored)?;
    let lookup_docs = to_documents(&lookups)?;
    let (inserted, lookups_added) = store
        .import_paired(
            Batch::new(CITY_COLLECTION, &city_docs),
            Batch::new(LOOKUP_COLLECTION, &lookup_docs),
        )
        .await?;

    info!("{} cities added to {} collection", inserted, CITY_COLLECTION);
    info!("{} {} records added to {} collection", lookups_added, LookupKind::City, LOOKUP_COLLECTION);
    Ok(inserted)
}
