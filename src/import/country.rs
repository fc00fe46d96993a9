//! Country stage: add provider countries missing from the shared collection

use super::source::{read_json_array, ImportError, InputFile, InputFiles};
use crate::store::{document_key, to_documents, DocumentStore};
use crate::types::{Country, ProviderCountry, COUNTRY_COLLECTION};
use std::collections::HashSet;
use tracing::{debug, info};

/// Provider countries whose code is not yet stored, first occurrence wins
pub fn new_countries(provider: &[ProviderCountry], existing: &HashSet<String>) -> Vec<Country> {
    let mut seen: HashSet<&str> = HashSet::new();
    provider
        .iter()
        .filter(|c| !existing.contains(&c.code) && seen.insert(c.code.as_str()))
        .map(|c| Country {
            key: c.code.clone(),
            code: c.code.clone(),
            name: c.name.clone(),
        })
        .collect()
}

/// Insert countries from `Country.json` whose code is not already a key
///
/// The collection is never truncated; other importers share it.
pub async fn load_countries(store: &dyn DocumentStore, files: &InputFiles) -> Result<usize, ImportError> {
    let provider: Vec<ProviderCountry> = read_json_array(&files.path(InputFile::Country)).await?;

    if store.ensure_collection(COUNTRY_COLLECTION).await? {
        info!("{} collection created", COUNTRY_COLLECTION);
    }

    let existing: HashSet<String> = store
        .all(COUNTRY_COLLECTION)
        .await?
        .iter()
        .filter_map(|doc| document_key(doc).map(str::to_string))
        .collect();
    debug!("{} countries already stored", existing.len());

    let added = new_countries(&provider, &existing);
    for document in to_documents(&added)? {
        store.insert(COUNTRY_COLLECTION, &document).await?;
    }

    info!("{} countries added to {} collection", added.len(), COUNTRY_COLLECTION);
    Ok(added.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(code: &str, name: &str) -> ProviderCountry {
        ProviderCountry {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn skips_codes_already_stored() {
        let existing: HashSet<String> = ["FR".to_string()].into_iter().collect();
        let added = new_countries(
            &[provider("FR", "France"), provider("US", "United States")],
            &existing,
        );
        assert_eq!(
            added,
            vec![Country {
                key: "US".to_string(),
                code: "US".to_string(),
                name: "United States".to_string(),
            }]
        );
    }

    #[test]
    fn repeated_codes_in_input_are_added_once() {
        let added = new_countries(
            &[provider("AE", "United Arab Emirates"), provider("AE", "UAE")],
            &HashSet::new(),
        );
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].name, "United Arab Emirates");
    }
}
