//! Qdrant backend for the vector index
//!
//! Talks to the Qdrant REST API directly with `reqwest`. Every write is sent
//! with `wait=true`, so a successful `upsert` is visible to the next
//! `exists` call.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument};

use super::error::StoreError;
use super::filter::{FieldValue, Predicate, SearchFilter};
use super::{
    BOOL_FIELDS, KEYWORD_FIELDS, PageRecord, PointId, RecordKind, SearchHit, StoredPoint,
    VectorStore,
};

/// Default timeout for index requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a Qdrant collection
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub host: String,
    pub port: u16,
    pub collection: String,
    /// Dimension of every vector in the collection
    pub vector_size: usize,
    pub timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6333,
            collection: "ireland_places".to_string(),
            vector_size: 384,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
        }
    }
}

impl QdrantConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct KindOnly {
    #[serde(default)]
    payload: KindPayload,
}

#[derive(Debug, Default, Deserialize)]
struct KindPayload {
    #[serde(rename = "type", default)]
    kind: Option<RecordKind>,
}

/// `VectorStore` over a Qdrant collection
#[derive(Clone)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
    config: QdrantConfig,
}

impl QdrantStore {
    pub fn new(config: QdrantConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            config,
        })
    }

    /// Point at an explicit base URL instead of `http://host:port`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    fn collection_url(&self, path: &str) -> String {
        format!(
            "{}/collections/{}{}",
            self.base_url, self.config.collection, path
        )
    }

    /// Send a request and return the status with the raw body
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, String), StoreError> {
        let mut request = self.client.request(method, url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("api-key", api_key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T, StoreError> {
        let (status, text) = self.send(method, url, body).await?;
        if !status.is_success() {
            error!("Qdrant error: {} - {}", status, text);
            return Err(api_error(status, &text));
        }
        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| StoreError::Data(format!("Failed to parse response: {}", e)))?;
        Ok(envelope.result)
    }

    /// Collection description, `None` when the collection does not exist
    async fn collection_info(&self) -> Result<Option<Value>, StoreError> {
        let (status, text) = self
            .send(Method::GET, &self.collection_url(""), None)
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        let envelope: Envelope<Value> = serde_json::from_str(&text)?;
        Ok(Some(envelope.result))
    }

    async fn create_collection(&self) -> Result<(), StoreError> {
        let body = json!({
            "vectors": {
                "size": self.config.vector_size,
                "distance": "Cosine",
            }
        });
        let _: Value = self
            .execute(Method::PUT, &self.collection_url(""), Some(&body))
            .await?;
        info!(
            "Created collection {} ({} dimensions, cosine)",
            self.config.collection, self.config.vector_size
        );
        Ok(())
    }

    async fn create_payload_index(&self, field: &str, schema: &str) -> Result<(), StoreError> {
        let body = json!({ "field_name": field, "field_schema": schema });
        let _: Value = self
            .execute(
                Method::PUT,
                &self.collection_url("/index?wait=true"),
                Some(&body),
            )
            .await?;
        debug!("Created {} payload index on {}", schema, field);
        Ok(())
    }
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["status"]["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Render a filter as a Qdrant `must` / `must_not` object
pub(crate) fn qdrant_filter(filter: &SearchFilter) -> Option<Value> {
    let mut must = Vec::new();
    let mut must_not = Vec::new();

    for predicate in filter.predicates() {
        match predicate {
            Predicate::Equals {
                field,
                value: FieldValue::Keyword(value),
            } => must.push(json!({ "key": field, "match": { "value": value } })),
            Predicate::Equals {
                field,
                value: FieldValue::Bool(value),
            } => must.push(json!({ "key": field, "match": { "value": value } })),
            Predicate::Contains { field, value } => {
                must.push(json!({ "key": field, "match": { "value": value } }))
            }
            Predicate::NotEmpty { field } => {
                must_not.push(json!({ "is_empty": { "key": field } }))
            }
        }
    }

    if must.is_empty() && must_not.is_empty() {
        return None;
    }
    let mut rendered = serde_json::Map::new();
    if !must.is_empty() {
        rendered.insert("must".to_string(), Value::Array(must));
    }
    if !must_not.is_empty() {
        rendered.insert("must_not".to_string(), Value::Array(must_not));
    }
    Some(Value::Object(rendered))
}

impl VectorStore for QdrantStore {
    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/collections", self.base_url);
        let _: Value = self.execute(Method::GET, &url, None).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.config.collection))]
    async fn ensure_collection(&self) -> Result<(), StoreError> {
        let schema: HashMap<String, Value> = match self.collection_info().await? {
            Some(info) => {
                let size = info["config"]["params"]["vectors"]["size"].as_u64();
                if size != Some(self.config.vector_size as u64) {
                    return Err(StoreError::Schema(format!(
                        "collection {} has vector size {:?}, expected {}",
                        self.config.collection, size, self.config.vector_size
                    )));
                }
                serde_json::from_value(info["payload_schema"].clone()).unwrap_or_default()
            }
            None => {
                self.create_collection().await?;
                HashMap::new()
            }
        };

        for field in KEYWORD_FIELDS {
            if !schema.contains_key(field) {
                self.create_payload_index(field, "keyword").await?;
            }
        }
        for field in BOOL_FIELDS {
            if !schema.contains_key(field) {
                self.create_payload_index(field, "bool").await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, url: &str) -> Result<Option<StoredPoint>, StoreError> {
        let body = json!({ "ids": [PointId::from_url(url)], "with_payload": true });
        let points: Vec<StoredPoint> = self
            .execute(Method::POST, &self.collection_url("/points"), Some(&body))
            .await?;
        Ok(points.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn record_kind(&self, url: &str) -> Result<Option<RecordKind>, StoreError> {
        let body = json!({
            "ids": [PointId::from_url(url)],
            "with_payload": { "include": ["type"] },
        });
        let points: Vec<KindOnly> = self
            .execute(Method::POST, &self.collection_url("/points"), Some(&body))
            .await?;
        // a point without a type predates typed payloads and counts as visited
        Ok(points
            .into_iter()
            .next()
            .map(|point| point.payload.kind.unwrap_or(RecordKind::Origin)))
    }

    #[instrument(skip(self, record), fields(id = %record.id, url = %record.payload.url))]
    async fn upsert(&self, record: &PageRecord) -> Result<(), StoreError> {
        let body = json!({
            "points": [{
                "id": record.id,
                "vector": record.vector,
                "payload": record.payload,
            }]
        });
        let _: Value = self
            .execute(
                Method::PUT,
                &self.collection_url("/points?wait=true"),
                Some(&body),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, vector, filter))]
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let mut body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        if let Some(filter) = qdrant_filter(filter) {
            body["filter"] = filter;
        }
        self.execute(
            Method::POST,
            &self.collection_url("/points/search"),
            Some(&body),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<u64, StoreError> {
        let body = json!({ "exact": true });
        let result: CountResult = self
            .execute(
                Method::POST,
                &self.collection_url("/points/count"),
                Some(&body),
            )
            .await?;
        Ok(result.count)
    }
}
