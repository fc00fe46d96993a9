//! Hotel stage: reload hotels shard by shard with their lookup records

use super::maps::{build_chain_map, build_facility_map, ChainMap, FacilityMap};
use super::progress::ShardProgress;
use super::reset_collection;
use super::sequence::LookupKeys;
use super::source::{read_json_array, ImportError, InputFile, InputFiles};
use crate::store::{fetch_all, to_documents, Batch, DocumentStore, StoreError};
use crate::types::{
    City, Country, Hotel, LookupKind, LookupRecord, NamedRecord, PropertyChainLink,
    ProviderId, ProviderProperty, ProviderRef, CITY_COLLECTION, COUNTRY_COLLECTION,
    FULLTEXT_FIELD, HOTEL_COLLECTION, HOTEL_RESERVED_FIELDS, LOOKUP_COLLECTION,
};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Reference data every hotel is joined against
#[derive(Debug, Clone, Default)]
pub struct HotelContext {
    /// Accommodation type id → display name
    pub accommodations: HashMap<ProviderId, String>,
    pub chains: ChainMap,
    pub facilities: FacilityMap,
}

impl HotelContext {
    pub fn new(accommodations: &[NamedRecord], chains: ChainMap, facilities: FacilityMap) -> Self {
        Self {
            accommodations: accommodations.iter().map(|a| (a.id, a.name.clone())).collect(),
            chains,
            facilities,
        }
    }
}

/// Counts reported by the hotel stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HotelStats {
    pub hotels: usize,
    pub lookups: usize,
    pub shards: usize,
    pub facility_shards: usize,
}

/// Build the stored hotel from a provider property
///
/// Provider fields outside the typed ones pass through, except names the
/// hotel document owns.
pub fn transform_hotel(
    property: ProviderProperty,
    lookup_key: String,
    ctx: &HotelContext,
) -> Result<Hotel, ImportError> {
    let accommodation = ctx.accommodations.get(&property.accommodation).ok_or_else(|| {
        ImportError::missing(
            "accommodation",
            property.accommodation,
            format!("hotel {}", property.id),
        )
    })?;

    let mut extra = property.extra;
    for field in HOTEL_RESERVED_FIELDS {
        extra.remove(field);
    }

    Ok(Hotel {
        key: property.id.to_string(),
        name: property.name.unwrap_or_default(),
        city_id: property.property_city_id.to_string(),
        accommodation: accommodation.clone(),
        chains: ctx.chains.get(&property.id).cloned(),
        facilities: ctx.facilities.get(&property.id).cloned().unwrap_or_default(),
        lookup_key,
        extra,
    })
}

/// Lookup record for a stored hotel
pub fn hotel_lookup(hotel: &Hotel, city: &City, country: &Country) -> LookupRecord {
    LookupRecord {
        key: hotel.lookup_key.clone(),
        kind: LookupKind::Hotel,
        name: format!("{}, {} {}", hotel.name, city.name, country.name),
        fulltext: format!(
            "{} {} {} {} {}",
            hotel.name, city.name, city.destination, country.name, country.key
        ),
        rate: 0,
        providers: vec![ProviderRef::parto(HOTEL_COLLECTION, &hotel.key)],
    }
}

/// Read the cities a shard references, keyed by city key
async fn shard_cities(
    store: &dyn DocumentStore,
    properties: &[ProviderProperty],
) -> Result<HashMap<String, City>, ImportError> {
    let keys: Vec<String> = properties
        .iter()
        .map(|p| p.property_city_id.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cities = HashMap::with_capacity(keys.len());
    for (key, document) in store.get_many(CITY_COLLECTION, &keys).await? {
        let city: City = serde_json::from_value(document).map_err(StoreError::from)?;
        cities.insert(key, city);
    }
    Ok(cities)
}

/// Transform and write one hotel shard
///
/// Nothing from the shard is written if any hotel in it fails to join.
async fn import_shard(
    store: &dyn DocumentStore,
    shard: &Path,
    ctx: &HotelContext,
    countries: &HashMap<String, Country>,
    keys: &mut LookupKeys,
    quiet: bool,
) -> Result<usize, ImportError> {
    let properties: Vec<ProviderProperty> = read_json_array(shard).await?;
    let file_name = shard
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    info!("{} hotels in file: {}", properties.len(), file_name);

    if properties.is_empty() {
        return Ok(0);
    }

    let cities = shard_cities(store, &properties).await?;
    debug!("{} cities referenced by {}", cities.len(), file_name);

    let mut progress = ShardProgress::new(shard, properties.len() as u64, quiet);
    let mut hotels = Vec::with_capacity(properties.len());
    let mut lookups = Vec::with_capacity(properties.len());

    for property in properties {
        let joined = join_hotel(property, ctx, &cities, countries, keys);
        let (hotel, lookup) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        };
        progress.hotel_transformed(&hotel.name);
        hotels.push(hotel);
        lookups.push(lookup);
    }
    progress.finish();

    let hotel_docs = to_documents(&hotels)?;
    let lookup_docs = to_documents(&lookups)?;
    let (inserted, lookups_added) = store
        .import_paired(
            Batch::new(HOTEL_COLLECTION, &hotel_docs),
            Batch::new(LOOKUP_COLLECTION, &lookup_docs),
        )
        .await?;

    debug!(
        "{} hotels and {} {} records written from {}",
        inserted,
        lookups_added,
        LookupKind::Hotel,
        file_name
    );
    Ok(inserted)
}

fn join_hotel(
    property: ProviderProperty,
    ctx: &HotelContext,
    cities: &HashMap<String, City>,
    countries: &HashMap<String, Country>,
    keys: &mut LookupKeys,
) -> Result<(Hotel, LookupRecord), ImportError> {
    let city_key = property.property_city_id.to_string();
    let city = cities
        .get(&city_key)
        .ok_or_else(|| ImportError::missing("city", &city_key, format!("hotel {}", property.id)))?;
    let country = countries.get(&city.country_id).ok_or_else(|| {
        ImportError::missing("country", &city.country_id, format!("city {}", city.key))
    })?;

    let hotel = transform_hotel(property, keys.next_key(), ctx)?;
    let lookup = hotel_lookup(&hotel, city, country);
    Ok((hotel, lookup))
}

/// Truncate and reload `PartoHotel`, appending hotel records to `HotelLookup`
///
/// Shards are written one at a time; a failure leaves earlier shards in place.
pub async fn load_hotels(
    store: &dyn DocumentStore,
    files: &InputFiles,
    keys: &mut LookupKeys,
    quiet: bool,
) -> Result<HotelStats, ImportError> {
    let accommodations: Vec<NamedRecord> =
        read_json_array(&files.path(InputFile::PropertyAccommodation)).await?;
    let chains: Vec<NamedRecord> = read_json_array(&files.path(InputFile::Chain)).await?;
    let chain_links: Vec<PropertyChainLink> =
        read_json_array(&files.path(InputFile::PropertyChain)).await?;
    let chain_map = build_chain_map(&chains, &chain_links)?;

    let facility_shards = files.facility_shards()?;
    let facility_map = build_facility_map(&facility_shards).await?;
    let hotel_shards = files.hotel_shards()?;
    info!("{} hotel shards found", hotel_shards.len());

    let ctx = HotelContext::new(&accommodations, chain_map, facility_map);

    reset_collection(store, HOTEL_COLLECTION).await?;
    if store.ensure_collection(LOOKUP_COLLECTION).await? {
        info!("{} collection created", LOOKUP_COLLECTION);
    }

    let countries: HashMap<String, Country> = fetch_all::<Country>(store, COUNTRY_COLLECTION)
        .await?
        .into_iter()
        .map(|c| (c.key.clone(), c))
        .collect();

    let mut stats = HotelStats {
        facility_shards: facility_shards.len(),
        ..HotelStats::default()
    };

    for shard in &hotel_shards {
        let inserted = import_shard(store, shard, &ctx, &countries, keys, quiet).await?;
        stats.hotels += inserted;
        stats.lookups += inserted;
        stats.shards += 1;
    }

    store.ensure_fulltext_index(LOOKUP_COLLECTION, FULLTEXT_FIELD).await?;
    info!("Fulltext index ensured on {}.{}", LOOKUP_COLLECTION, FULLTEXT_FIELD);

    info!("{} hotels added to {} collection", stats.hotels, HOTEL_COLLECTION);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn property(value: serde_json::Value) -> ProviderProperty {
        serde_json::from_value(value).unwrap()
    }

    fn context() -> HotelContext {
        let mut chains = ChainMap::new();
        chains.insert(10, vec!["Hilton".to_string()]);
        let mut facilities = FacilityMap::new();
        facilities.insert(10, vec![3, 1]);
        HotelContext::new(
            &[NamedRecord {
                id: 1,
                name: "Hotel".to_string(),
            }],
            chains,
            facilities,
        )
    }

    fn city() -> City {
        City {
            key: "3".to_string(),
            name: "Dubai".to_string(),
            destination: "Dubai Emirate".to_string(),
            country_id: "AE".to_string(),
            lookup_key: "2".to_string(),
        }
    }

    fn country() -> Country {
        Country {
            key: "AE".to_string(),
            code: "AE".to_string(),
            name: "United Arab Emirates".to_string(),
        }
    }

    #[test]
    fn transform_joins_reference_data() {
        let hotel = transform_hotel(
            property(json!({
                "Id": 10, "Name": "Sea View", "PropertyCityId": 3,
                "Accommodation": 1, "Star": 5
            })),
            "7".to_string(),
            &context(),
        )
        .unwrap();

        assert_eq!(hotel.key, "10");
        assert_eq!(hotel.city_id, "3");
        assert_eq!(hotel.accommodation, "Hotel");
        assert_eq!(hotel.chains, Some(vec!["Hilton".to_string()]));
        assert_eq!(hotel.facilities, vec![3, 1]);
        assert_eq!(hotel.lookup_key, "7");
        assert_eq!(hotel.extra.get("Star"), Some(&json!(5)));
    }

    #[test]
    fn hotel_without_links_has_no_chains_and_empty_facilities() {
        let hotel = transform_hotel(
            property(json!({"Id": 11, "Name": "Plain", "PropertyCityId": 3, "Accommodation": 1})),
            "8".to_string(),
            &context(),
        )
        .unwrap();
        assert!(hotel.chains.is_none());
        assert!(hotel.facilities.is_empty());
    }

    #[test]
    fn reserved_fields_do_not_pass_through() {
        let hotel = transform_hotel(
            property(json!({
                "Id": 11, "Name": "Plain", "PropertyCityId": 3, "Accommodation": 1,
                "_key": "spoofed", "lookupKey": "0", "Chains": ["Fake"]
            })),
            "8".to_string(),
            &context(),
        )
        .unwrap();

        let value = serde_json::to_value(&hotel).unwrap();
        assert_eq!(value["_key"], json!("11"));
        assert_eq!(value["lookupKey"], json!("8"));
        assert!(value.get("Chains").is_none());
    }

    #[test]
    fn missing_or_null_name_is_stored_empty() {
        for value in [
            json!({"Id": 12, "PropertyCityId": 3, "Accommodation": 1}),
            json!({"Id": 12, "Name": null, "PropertyCityId": 3, "Accommodation": 1}),
        ] {
            let hotel = transform_hotel(property(value), "9".to_string(), &context()).unwrap();
            assert_eq!(hotel.name, "");
            assert!(!hotel.extra.contains_key("Name"));
        }
    }

    #[test]
    fn unknown_accommodation_is_fatal() {
        let err = transform_hotel(
            property(json!({"Id": 11, "Name": "Plain", "PropertyCityId": 3, "Accommodation": 9})),
            "8".to_string(),
            &context(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Missing accommodation '9' referenced by hotel 11"));
    }

    #[test]
    fn hotel_lookup_has_display_name_and_fulltext() {
        let hotel = transform_hotel(
            property(json!({"Id": 10, "Name": "Sea View", "PropertyCityId": 3, "Accommodation": 1})),
            "7".to_string(),
            &context(),
        )
        .unwrap();
        let lookup = hotel_lookup(&hotel, &city(), &country());

        assert_eq!(lookup.key, "7");
        assert_eq!(lookup.kind, LookupKind::Hotel);
        assert_eq!(lookup.name, "Sea View, Dubai United Arab Emirates");
        assert_eq!(
            lookup.fulltext,
            "Sea View Dubai Dubai Emirate United Arab Emirates AE"
        );
        assert_eq!(lookup.rate, 0);
        assert_eq!(
            lookup.providers[0].collection_id.as_deref(),
            Some("PartoHotel/10")
        );
    }

    #[test]
    fn missing_city_is_reported_with_the_hotel() {
        let mut keys = LookupKeys::new();
        let err = join_hotel(
            property(json!({"Id": 10, "Name": "Sea View", "PropertyCityId": 99, "Accommodation": 1})),
            &context(),
            &HashMap::new(),
            &HashMap::new(),
            &mut keys,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Missing city '99' referenced by hotel 10"));
        assert_eq!(keys.issued(), 0);
    }
}
