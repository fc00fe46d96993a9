//! Facility stage: reload facilities with their group names

use super::reset_collection;
use super::source::{read_json_array, ImportError, InputFile, InputFiles};
use crate::store::{to_documents, DocumentStore};
use crate::types::{Facility, NamedRecord, ProviderFacility, FACILITY_COLLECTION};
use std::collections::HashMap;
use tracing::info;

/// Join each facility to its group by id
pub fn build_facilities(
    facilities: &[ProviderFacility],
    groups: &[NamedRecord],
) -> Result<Vec<Facility>, ImportError> {
    let group_names: HashMap<_, _> = groups.iter().map(|g| (g.id, g.name.as_str())).collect();

    facilities
        .iter()
        .map(|facility| {
            let group = group_names.get(&facility.facility_group_id).ok_or_else(|| {
                ImportError::missing(
                    "facility group",
                    facility.facility_group_id,
                    format!("facility {}", facility.id),
                )
            })?;
            Ok(Facility {
                key: facility.id.to_string(),
                name: facility.name.clone(),
                group: group.to_string(),
            })
        })
        .collect()
}

/// Truncate and reload `PartoHotelFacility`
pub async fn load_facilities(store: &dyn DocumentStore, files: &InputFiles) -> Result<usize, ImportError> {
    let groups: Vec<NamedRecord> = read_json_array(&files.path(InputFile::FacilityGroup)).await?;
    let facilities: Vec<ProviderFacility> = read_json_array(&files.path(InputFile::Facility)).await?;

    reset_collection(store, FACILITY_COLLECTION).await?;

    let documents = to_documents(&build_facilities(&facilities, &groups)?)?;
    let inserted = store.import(FACILITY_COLLECTION, &documents).await?;

    info!("{} facilities added to {} collection", inserted, FACILITY_COLLECTION);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: i64, name: &str) -> NamedRecord {
        NamedRecord {
            id,
            name: name.to_string(),
        }
    }

    fn facility(id: i64, name: &str, group_id: i64) -> ProviderFacility {
        ProviderFacility {
            id,
            name: name.to_string(),
            facility_group_id: group_id,
        }
    }

    #[test]
    fn facilities_carry_group_name() {
        let built = build_facilities(
            &[facility(5, "Pool", 1), facility(6, "Wi-Fi", 2)],
            &[group(1, "Leisure"), group(2, "Internet")],
        )
        .unwrap();

        assert_eq!(built[0].key, "5");
        assert_eq!(built[0].group, "Leisure");
        assert_eq!(built[1].group, "Internet");
    }

    #[test]
    fn unknown_group_is_fatal() {
        let err = build_facilities(&[facility(5, "Pool", 9)], &[group(1, "Leisure")]).unwrap_err();
        match err {
            ImportError::MissingReference { entity, key, .. } => {
                assert_eq!(entity, "facility group");
                assert_eq!(key, "9");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
