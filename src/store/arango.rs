//! ArangoDB document store over the HTTP API
//!
//! All requests go to `{endpoint}/_db/{database}/_api/...` with basic auth.
//! Bulk inserts use the multi-document endpoint so they can join a stream
//! transaction via the `x-arango-trx-id` header.

use super::{document_key, Batch, DocumentStore, StoreError, StoreResult};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header binding a request to a stream transaction
const TRANSACTION_HEADER: &str = "x-arango-trx-id";

/// ArangoDB error number for "duplicate name" on collection creation
const ERROR_DUPLICATE_NAME: i64 = 1207;

/// ArangoDB store
#[derive(Debug)]
pub struct ArangoStore {
    client: Client,
    api_base: String,
    username: String,
    password: Option<String>,
    batch_size: usize,
    transactional: bool,
}

/// Error body returned by the HTTP API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    error_num: i64,
    #[serde(default)]
    error_message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorResponse {
    #[serde(default)]
    result: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    result: TransactionInfo,
}

#[derive(Debug, Deserialize)]
struct TransactionInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// API root for a database
fn api_base(endpoint: &str, database: &str) -> String {
    format!("{}/_db/{}/_api", endpoint.trim_end_matches('/'), database)
}

/// Turn a non-success response into a [`StoreError::Api`]
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => StoreError::Api {
            status: status.as_u16(),
            code: parsed.error_num,
            message: parsed.error_message,
        },
        Err(_) => StoreError::Api {
            status: status.as_u16(),
            code: 0,
            message: body.to_string(),
        },
    }
}

/// Inspect a multi-document insert response; the first per-document error fails the batch
fn check_insert_results(collection: &str, results: &[Value]) -> StoreResult<usize> {
    for result in results {
        if result.get("error").and_then(Value::as_bool) == Some(true) {
            let code = result.get("errorNum").and_then(Value::as_i64).unwrap_or(0);
            let message = result
                .get("errorMessage")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(StoreError::Api {
                status: 409,
                code,
                message: format!("insert into {} failed: {}", collection, message),
            });
        }
    }
    Ok(results.len())
}

impl ArangoStore {
    /// Create a client for the configured database. No request is made.
    pub fn new(config: &DatabaseConfig) -> StoreResult<Self> {
        info!(
            "Initializing ArangoDB store: endpoint={}, database={}",
            config.endpoint, config.database
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let password = config.resolve_password();
        if password.is_none() {
            warn!("No database password configured for user {}", config.username);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base(&config.endpoint, &config.database),
            username: config.username.clone(),
            password,
            batch_size: config.batch_size.max(1),
            transactional: config.transactional,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.api_base, path))
            .basic_auth(&self.username, self.password.as_deref())
    }

    /// Insert documents in `batch_size` chunks, optionally inside a transaction
    async fn insert_chunked(
        &self,
        collection: &str,
        documents: &[Value],
        transaction: Option<&str>,
    ) -> StoreResult<usize> {
        let mut inserted = 0;
        for chunk in documents.chunks(self.batch_size) {
            let mut request = self.request(Method::POST, &format!("document/{}", collection));
            if let Some(id) = transaction {
                request = request.header(TRANSACTION_HEADER, id);
            }
            let response = check(request.json(chunk).send().await?).await?;
            let results: Vec<Value> = response.json().await?;
            inserted += check_insert_results(collection, &results)?;
            debug!("Inserted {} documents into {}", inserted, collection);
        }
        Ok(inserted)
    }

    async fn begin_transaction(&self, write: &[&str]) -> StoreResult<String> {
        let body = json!({ "collections": { "write": write } });
        let response = self
            .request(Method::POST, "transaction/begin")
            .json(&body)
            .send()
            .await?;
        let response = check(response)
            .await
            .map_err(|e| StoreError::Transaction(format!("begin failed: {}", e)))?;
        let parsed: TransactionResponse = response.json().await?;
        Ok(parsed.result.id)
    }

    async fn commit_transaction(&self, id: &str) -> StoreResult<()> {
        let response = self
            .request(Method::PUT, &format!("transaction/{}", id))
            .send()
            .await?;
        check(response)
            .await
            .map_err(|e| StoreError::Transaction(format!("commit of {} failed: {}", id, e)))?;
        Ok(())
    }

    async fn abort_transaction(&self, id: &str) {
        let result = match self
            .request(Method::DELETE, &format!("transaction/{}", id))
            .send()
            .await
        {
            Ok(response) => check(response).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!("Failed to abort transaction {}: {}", id, e);
        }
    }

    async fn insert_pair(&self, entities: Batch<'_>, lookups: Batch<'_>, transaction: &str) -> StoreResult<(usize, usize)> {
        let entity_count = self
            .insert_chunked(entities.collection, entities.documents, Some(transaction))
            .await?;
        let lookup_count = self
            .insert_chunked(lookups.collection, lookups.documents, Some(transaction))
            .await?;
        Ok((entity_count, lookup_count))
    }
}

#[async_trait]
impl DocumentStore for ArangoStore {
    async fn ensure_collection(&self, name: &str) -> StoreResult<bool> {
        let response = self
            .request(Method::GET, &format!("collection/{}", name))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(false);
        }
        if response.status() != StatusCode::NOT_FOUND {
            check(response).await?;
            return Ok(false);
        }

        let response = self
            .request(Method::POST, "collection")
            .json(&json!({ "name": name }))
            .send()
            .await?;
        match check(response).await {
            Ok(_) => {
                debug!("Created collection {}", name);
                Ok(true)
            }
            // Created concurrently by someone else
            Err(StoreError::Api { code, .. }) if code == ERROR_DUPLICATE_NAME => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn truncate(&self, name: &str) -> StoreResult<()> {
        let response = self
            .request(Method::PUT, &format!("collection/{}/truncate", name))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn all(&self, name: &str) -> StoreResult<Vec<Value>> {
        let body = json!({
            "query": "FOR d IN @@collection RETURN d",
            "bindVars": { "@collection": name },
            "batchSize": self.batch_size,
        });
        let response = check(self.request(Method::POST, "cursor").json(&body).send().await?).await?;
        let mut page: CursorResponse = response.json().await?;
        let mut documents = std::mem::take(&mut page.result);

        while page.has_more {
            let Some(id) = page.id.clone() else {
                break;
            };
            let response = check(
                self.request(Method::PUT, &format!("cursor/{}", id))
                    .send()
                    .await?,
            )
            .await?;
            page = response.json().await?;
            documents.append(&mut page.result);
        }

        debug!("Read {} documents from {}", documents.len(), name);
        Ok(documents)
    }

    async fn get_many(&self, name: &str, keys: &[String]) -> StoreResult<HashMap<String, Value>> {
        let mut found = HashMap::with_capacity(keys.len());
        for chunk in keys.chunks(self.batch_size) {
            let response = self
                .request(Method::PUT, &format!("document/{}?onlyget=true", name))
                .json(chunk)
                .send()
                .await?;
            let results: Vec<Value> = check(response).await?.json().await?;
            for doc in results {
                // Missing keys come back as error entries
                if doc.get("error").and_then(Value::as_bool) == Some(true) {
                    continue;
                }
                if let Some(key) = document_key(&doc).map(str::to_string) {
                    found.insert(key, doc);
                }
            }
        }
        Ok(found)
    }

    async fn insert(&self, name: &str, document: &Value) -> StoreResult<()> {
        let response = self
            .request(Method::POST, &format!("document/{}", name))
            .json(document)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn import(&self, name: &str, documents: &[Value]) -> StoreResult<usize> {
        self.insert_chunked(name, documents, None).await
    }

    async fn import_paired(&self, entities: Batch<'_>, lookups: Batch<'_>) -> StoreResult<(usize, usize)> {
        if !self.transactional {
            let entity_count = self.import(entities.collection, entities.documents).await?;
            let lookup_count = self.import(lookups.collection, lookups.documents).await?;
            return Ok((entity_count, lookup_count));
        }

        let transaction = self
            .begin_transaction(&[entities.collection, lookups.collection])
            .await?;
        debug!("Began transaction {}", transaction);

        match self.insert_pair(entities, lookups, &transaction).await {
            Ok(counts) => {
                self.commit_transaction(&transaction).await?;
                Ok(counts)
            }
            Err(e) => {
                self.abort_transaction(&transaction).await;
                Err(e)
            }
        }
    }

    async fn ensure_fulltext_index(&self, name: &str, field: &str) -> StoreResult<()> {
        let response = self
            .request(Method::POST, &format!("index?collection={}", name))
            .json(&json!({ "type": "fulltext", "fields": [field] }))
            .send()
            .await?;
        let status = response.status();
        check(response).await?;
        if status == StatusCode::CREATED {
            info!("Created fulltext index on {}.{}", name, field);
        } else {
            debug!("Fulltext index on {}.{} already present", name, field);
        }
        Ok(())
    }

    async fn count(&self, name: &str) -> StoreResult<u64> {
        let response = self
            .request(Method::GET, &format!("collection/{}/count", name))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::CollectionNotFound(name.to_string()));
        }
        let parsed: CountResponse = check(response).await?.json().await?;
        Ok(parsed.count)
    }

    fn name(&self) -> &str {
        "arangodb"
    }
}
