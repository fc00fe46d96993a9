//! Property aggregation maps built before hotels are transformed

use super::source::{read_json_array, ImportError};
use crate::types::{NamedRecord, PropertyChainLink, PropertyFacilityLink, ProviderId};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Property id → chain display names, in link-file order
pub type ChainMap = HashMap<ProviderId, Vec<String>>;

/// Property id → facility ids, in shard order
pub type FacilityMap = HashMap<ProviderId, Vec<ProviderId>>;

/// Join property-chain links to chain names. Duplicate links are kept.
pub fn build_chain_map(chains: &[NamedRecord], links: &[PropertyChainLink]) -> Result<ChainMap, ImportError> {
    let names: HashMap<_, _> = chains.iter().map(|c| (c.id, c.name.as_str())).collect();
    let mut map = ChainMap::new();

    for link in links {
        let name = names.get(&link.chain_id).ok_or_else(|| {
            ImportError::missing("chain", link.chain_id, format!("property {}", link.property_id))
        })?;
        map.entry(link.property_id).or_default().push(name.to_string());
    }

    info!("Size of PropertyChain map: {}", map.len());
    Ok(map)
}

/// Append one shard's facility links to the map
pub fn append_facility_links(map: &mut FacilityMap, links: &[PropertyFacilityLink]) {
    for link in links {
        map.entry(link.property_id).or_default().push(link.facility_id);
    }
}

/// Read every property-facility shard, in the given order, into one map
pub async fn build_facility_map(shards: &[PathBuf]) -> Result<FacilityMap, ImportError> {
    let mut map = FacilityMap::new();
    for shard in shards {
        let links: Vec<PropertyFacilityLink> = read_json_array(shard).await?;
        debug!("{} facility links in file: {}", links.len(), shard.display());
        append_facility_links(&mut map, &links);
    }
    info!("Size of PropertyFacility map: {}", map.len());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chain(id: i64, name: &str) -> NamedRecord {
        NamedRecord {
            id,
            name: name.to_string(),
        }
    }

    fn chain_link(property_id: i64, chain_id: i64) -> PropertyChainLink {
        PropertyChainLink {
            property_id,
            chain_id,
        }
    }

    #[test]
    fn chain_map_preserves_order_and_duplicates() {
        let map = build_chain_map(
            &[chain(1, "Hilton"), chain(2, "Marriott")],
            &[chain_link(10, 2), chain_link(10, 1), chain_link(11, 1), chain_link(10, 2)],
        )
        .unwrap();

        assert_eq!(map[&10], vec!["Marriott", "Hilton", "Marriott"]);
        assert_eq!(map[&11], vec!["Hilton"]);
        assert!(!map.contains_key(&12));
    }

    #[test]
    fn unknown_chain_is_fatal() {
        let err = build_chain_map(&[chain(1, "Hilton")], &[chain_link(10, 5)]).unwrap_err();
        assert!(err.to_string().contains("Missing chain '5' referenced by property 10"));
    }

    #[tokio::test]
    async fn facility_map_concatenates_shards_in_order() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("PropertyFacility_1.json");
        let second = dir.path().join("PropertyFacility_2.json");
        std::fs::write(
            &first,
            r#"[{"PropertyId": 10, "FacilityId": 3}, {"PropertyId": 11, "FacilityId": 4}]"#,
        )
        .unwrap();
        std::fs::write(
            &second,
            r#"[{"PropertyId": 10, "FacilityId": 1}, {"PropertyId": 10, "FacilityId": 3}]"#,
        )
        .unwrap();

        let map = build_facility_map(&[first, second]).await.unwrap();
        assert_eq!(map[&10], vec![3, 1, 3]);
        assert_eq!(map[&11], vec![4]);
    }
}
