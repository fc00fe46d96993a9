//! Core types for parto-import
//!
//! Provider records mirror the PascalCase JSON of the static dump. Stored
//! documents mirror the collections written to ArangoDB; their serde names
//! are the document attribute names other services query.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Numeric identifier used by the provider dump
pub type ProviderId = i64;

/// Document key (`_key`) in the store
pub type DocumentKey = String;

// ============================================================================
// Collection Names
// ============================================================================

/// Additive country collection shared with other importers
pub const COUNTRY_COLLECTION: &str = "Country";
/// Hotel facility reference data
pub const FACILITY_COLLECTION: &str = "PartoHotelFacility";
/// Provider cities
pub const CITY_COLLECTION: &str = "PartoHotelCity";
/// Provider hotels
pub const HOTEL_COLLECTION: &str = "PartoHotel";
/// Unified city/hotel search projection
pub const LOOKUP_COLLECTION: &str = "HotelLookup";
/// Attribute carrying the synthesized search text
pub const FULLTEXT_FIELD: &str = "Fulltext";

/// Every collection the importer writes, in pipeline order
pub const ALL_COLLECTIONS: [&str; 5] = [
    COUNTRY_COLLECTION,
    FACILITY_COLLECTION,
    CITY_COLLECTION,
    HOTEL_COLLECTION,
    LOOKUP_COLLECTION,
];

/// ArangoDB document handle (`_id`) for a key in a collection
pub fn document_handle(collection: &str, key: &str) -> String {
    format!("{}/{}", collection, key)
}

// ============================================================================
// Provider Records (input files)
// ============================================================================

/// Country.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderCountry {
    pub code: String,
    pub name: String,
}

/// Facility.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderFacility {
    pub id: ProviderId,
    pub name: String,
    pub facility_group_id: ProviderId,
}

/// FacilityGroup.json, PropertyAccommodation.json and Chain.json share this shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedRecord {
    pub id: ProviderId,
    pub name: String,
}

/// PropertyDestination.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderDestination {
    pub id: ProviderId,
    pub name: String,
    /// Country code, the key of a `Country` document
    pub country_id: String,
}

/// PropertyCity.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderCity {
    pub id: ProviderId,
    pub name: String,
    pub property_destination_id: ProviderId,
}

/// PropertyChain.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyChainLink {
    pub property_id: ProviderId,
    pub chain_id: ProviderId,
}

/// PropertyFacility_*.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyFacilityLink {
    pub property_id: ProviderId,
    pub facility_id: ProviderId,
}

/// Property_*.json
///
/// Only the joined fields are typed; everything else the provider sends is
/// kept in `extra` and written to the hotel document untouched. A missing or
/// null `Name` is accepted and stored as an empty name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProperty {
    #[serde(rename = "Id")]
    pub id: ProviderId,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "PropertyCityId")]
    pub property_city_id: ProviderId,
    /// Accommodation type id
    #[serde(rename = "Accommodation")]
    pub accommodation: ProviderId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Stored Documents
// ============================================================================

/// `Country` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "_key")]
    pub key: DocumentKey,
    #[serde(rename = "CountryCode", default)]
    pub code: String,
    #[serde(rename = "CountryName", default)]
    pub name: String,
}

/// `PartoHotelFacility` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(rename = "_key")]
    pub key: DocumentKey,
    #[serde(rename = "Name")]
    pub name: String,
    /// Owning group name, denormalized
    #[serde(rename = "Group")]
    pub group: String,
}

/// `PartoHotelCity` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "_key")]
    pub key: DocumentKey,
    #[serde(rename = "Name")]
    pub name: String,
    /// Destination name, denormalized
    #[serde(rename = "Destination")]
    pub destination: String,
    /// Key of the owning `Country`
    #[serde(rename = "CountryId")]
    pub country_id: DocumentKey,
    #[serde(rename = "lookupKey")]
    pub lookup_key: DocumentKey,
}

/// `PartoHotel` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(rename = "_key")]
    pub key: DocumentKey,
    #[serde(rename = "Name")]
    pub name: String,
    /// Key of the owning `PartoHotelCity`
    #[serde(rename = "CityId")]
    pub city_id: DocumentKey,
    /// Accommodation type display name
    #[serde(rename = "Accommodation")]
    pub accommodation: String,
    /// Chain names; absent when the property has no chain links
    #[serde(rename = "Chains", default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<Vec<String>>,
    /// Facility ids; empty when the property has no facility links
    #[serde(rename = "Facilities", default)]
    pub facilities: Vec<ProviderId>,
    #[serde(rename = "lookupKey")]
    pub lookup_key: DocumentKey,
    /// Provider fields passed through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attribute names owned by [`Hotel`]; pass-through fields never override them
pub const HOTEL_RESERVED_FIELDS: [&str; 9] = [
    "_key",
    "_id",
    "_rev",
    "Id",
    "PropertyCityId",
    "CityId",
    "Chains",
    "Facilities",
    "lookupKey",
];

// ============================================================================
// Lookup Records
// ============================================================================

/// Discriminator of a lookup record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LookupKind {
    City = 1,
    Hotel = 2,
}

impl From<LookupKind> for u8 {
    fn from(kind: LookupKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for LookupKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(LookupKind::City),
            2 => Ok(LookupKind::Hotel),
            other => Err(format!("unknown lookup type {}", other)),
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::City => write!(f, "city"),
            LookupKind::Hotel => write!(f, "hotel"),
        }
    }
}

/// Content provider a lookup record points back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProviderKind {
    Parto = 1,
}

impl From<ProviderKind> for u8 {
    fn from(kind: ProviderKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for ProviderKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ProviderKind::Parto),
            other => Err(format!("unknown provider type {}", other)),
        }
    }
}

/// Reference from a lookup record to a provider entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    #[serde(rename = "Type")]
    pub kind: ProviderKind,
    /// Provider-local key (the entity's `_key`)
    #[serde(rename = "Key")]
    pub key: DocumentKey,
    /// Entity document handle (`_id`)
    #[serde(rename = "CollectionId", default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

impl ProviderRef {
    /// Reference to a Parto entity stored in `collection`
    pub fn parto(collection: &str, key: &str) -> Self {
        Self {
            kind: ProviderKind::Parto,
            key: key.to_string(),
            collection_id: Some(document_handle(collection, key)),
        }
    }
}

/// `HotelLookup` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRecord {
    #[serde(rename = "_key")]
    pub key: DocumentKey,
    #[serde(rename = "Type")]
    pub kind: LookupKind,
    /// Display name
    #[serde(rename = "Name")]
    pub name: String,
    /// Concatenated search text
    #[serde(rename = "Fulltext")]
    pub fulltext: String,
    /// Rank boost (1 for top destinations)
    #[serde(rename = "Rate")]
    pub rate: u8,
    #[serde(rename = "Providers")]
    pub providers: Vec<ProviderRef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn country_serializes_with_store_attribute_names() {
        let country = Country {
            key: "US".to_string(),
            code: "US".to_string(),
            name: "United States".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&country).unwrap(),
            json!({"_key": "US", "CountryCode": "US", "CountryName": "United States"})
        );
    }

    #[test]
    fn lookup_kind_is_an_integer_on_the_wire() {
        let record = LookupRecord {
            key: "7".to_string(),
            kind: LookupKind::Hotel,
            name: "Grand, Dubai United Arab Emirates".to_string(),
            fulltext: "Grand Dubai Dubai United Arab Emirates AE".to_string(),
            rate: 0,
            providers: vec![ProviderRef::parto(HOTEL_COLLECTION, "42")],
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Type"], json!(2));
        assert_eq!(value["Providers"][0]["Type"], json!(1));
        assert_eq!(value["Providers"][0]["CollectionId"], json!("PartoHotel/42"));

        let back: LookupRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn lookup_kind_displays_as_entity_name() {
        assert_eq!(LookupKind::City.to_string(), "city");
        assert_eq!(format!("{} records", LookupKind::Hotel), "hotel records");
    }

    #[test]
    fn unknown_lookup_kind_is_rejected() {
        let result = serde_json::from_value::<LookupKind>(json!(9));
        assert!(result.is_err());
    }

    #[test]
    fn property_keeps_unknown_fields() {
        let property: ProviderProperty = serde_json::from_value(json!({
            "Id": 10,
            "Name": "Sea View",
            "PropertyCityId": 3,
            "Accommodation": 1,
            "Star": 4,
            "Address": "Beach Road"
        }))
        .unwrap();
        assert_eq!(property.id, 10);
        assert_eq!(property.extra.get("Star"), Some(&json!(4)));
        assert_eq!(property.extra.get("Address"), Some(&json!("Beach Road")));
        assert!(!property.extra.contains_key("Id"));
    }

    #[test]
    fn hotel_without_chains_omits_the_attribute() {
        let hotel = Hotel {
            key: "10".to_string(),
            name: "Sea View".to_string(),
            city_id: "3".to_string(),
            accommodation: "Hotel".to_string(),
            chains: None,
            facilities: Vec::new(),
            lookup_key: "5".to_string(),
            extra: Map::new(),
        };
        let value = serde_json::to_value(&hotel).unwrap();
        assert!(value.get("Chains").is_none());
        assert_eq!(value["Facilities"], json!([]));
    }
}
