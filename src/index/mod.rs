//! Vector index module
//!
//! This module defines the records written by the crawler, the URL-derived
//! point identity used for deduplication, and the `VectorStore` contract with
//! its two backends: a Qdrant collection over REST and a local libsql
//! database.

mod database;
pub mod error;
mod filter;
mod qdrant;
mod schema;

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::{AttractionCategory, Classification, LinkKind, LocationType};

pub use database::LibsqlStore;
pub use error::StoreError;
pub use filter::{FieldValue, Predicate, SearchFilter};
pub use qdrant::{QdrantConfig, QdrantStore};

/// Payload fields that carry a keyword index in the collection
pub const KEYWORD_FIELDS: [&str; 6] = [
    "type",
    "location_type",
    "attraction_category",
    "county",
    "region",
    "features",
];

/// Payload fields that carry a boolean index in the collection
pub const BOOL_FIELDS: [&str; 1] = ["tourism_related"];

/// Deterministic point identity derived from a page URL
///
/// The first 16 hex digits of the SHA-256 digest of the URL, read as an
/// unsigned 64-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u64);

impl PointId {
    pub fn from_url(url: &str) -> Self {
        let digest = Sha256::digest(url.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        PointId(u64::from_be_bytes(prefix))
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a record is a fetched page or a discovered link candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A page that was fetched and embedded from its content
    Origin,
    Place,
    Attraction,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Origin => "origin",
            RecordKind::Place => "place",
            RecordKind::Attraction => "attraction",
        }
    }

    /// Lightweight records are candidates nobody has fetched yet
    pub fn is_candidate(&self) -> bool {
        !matches!(self, RecordKind::Origin)
    }
}

impl From<LinkKind> for RecordKind {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Place => RecordKind::Place,
            LinkKind::Attraction => RecordKind::Attraction,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "origin" => Ok(RecordKind::Origin),
            "place" => Ok(RecordKind::Place),
            "attraction" => Ok(RecordKind::Attraction),
            other => Err(format!("unknown record type: {}", other)),
        }
    }
}

/// Metadata stored next to every vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    pub title: String,

    pub url: String,

    /// Page text, truncated; empty for lightweight records
    #[serde(default)]
    pub content: String,

    /// Paragraph around the link a lightweight record was discovered from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(rename = "type")]
    pub kind: RecordKind,

    #[serde(default)]
    pub location_type: LocationType,

    #[serde(default)]
    pub attraction_category: AttractionCategory,

    #[serde(default)]
    pub county: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// Sorted, unique feature tags
    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub price_range: Option<String>,

    #[serde(default)]
    pub opening_hours: Option<String>,

    #[serde(default)]
    pub tourism_related: bool,

    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl PagePayload {
    /// Payload for a fetched page
    pub fn origin(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self::build(
            url.into(),
            title.into(),
            content.into(),
            None,
            RecordKind::Origin,
            classification,
        )
    }

    /// Payload for a link candidate that has only been seen, not fetched
    pub fn lightweight(
        url: impl Into<String>,
        title: impl Into<String>,
        kind: LinkKind,
        context: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self::build(
            url.into(),
            title.into(),
            String::new(),
            Some(context.into()),
            kind.into(),
            classification,
        )
    }

    fn build(
        url: String,
        title: String,
        content: String,
        context: Option<String>,
        kind: RecordKind,
        classification: Classification,
    ) -> Self {
        Self {
            title,
            url,
            content,
            context,
            kind,
            location_type: classification.location_type,
            attraction_category: classification.attraction_category,
            county: classification.county,
            region: classification.region,
            features: classification.features.into_iter().collect(),
            price_range: classification.price_range,
            opening_hours: classification.opening_hours,
            tourism_related: classification.tourism_related,
            last_updated: Utc::now(),
        }
    }
}

/// A point ready to be written to the index
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: PointId,
    pub vector: Vec<f32>,
    pub payload: PagePayload,
}

impl PageRecord {
    /// The id is always derived from the payload URL
    pub fn new(vector: Vec<f32>, payload: PagePayload) -> Self {
        Self {
            id: PointId::from_url(&payload.url),
            vector,
            payload,
        }
    }
}

/// A point read back from the index
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredPoint {
    pub id: PointId,
    pub payload: PagePayload,
}

/// A similarity search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: PointId,
    pub score: f32,
    pub payload: PagePayload,
}

/// Operations the crawler and search need from a vector index
///
/// Writes are acknowledged: once `upsert` returns, `exists` for the same URL
/// observes the record.
pub trait VectorStore: Send + Sync {
    /// Cheap connectivity check
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Create the collection and its payload indexes if absent
    fn ensure_collection(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn retrieve(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<StoredPoint>, StoreError>> + Send;

    /// Kind of the record stored for `url`, if any
    fn record_kind(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<RecordKind>, StoreError>> + Send {
        async move { Ok(self.retrieve(url).await?.map(|point| point.payload.kind)) }
    }

    fn exists(&self, url: &str) -> impl Future<Output = Result<bool, StoreError>> + Send {
        async move { Ok(self.record_kind(url).await?.is_some()) }
    }

    /// Insert or overwrite by id
    fn upsert(&self, record: &PageRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Up to `limit` records matching every predicate of `filter`, best first
    fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: &SearchFilter,
    ) -> impl Future<Output = Result<Vec<SearchHit>, StoreError>> + Send;

    /// Number of points in the collection
    fn count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

impl<T: VectorStore> VectorStore for &T {
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).ping()
    }

    fn ensure_collection(&self) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).ensure_collection()
    }

    fn retrieve(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<StoredPoint>, StoreError>> + Send {
        (**self).retrieve(url)
    }

    fn record_kind(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<RecordKind>, StoreError>> + Send {
        (**self).record_kind(url)
    }

    fn exists(&self, url: &str) -> impl Future<Output = Result<bool, StoreError>> + Send {
        (**self).exists(url)
    }

    fn upsert(&self, record: &PageRecord) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).upsert(record)
    }

    fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: &SearchFilter,
    ) -> impl Future<Output = Result<Vec<SearchHit>, StoreError>> + Send {
        (**self).search(vector, limit, filter)
    }

    fn count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send {
        (**self).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, classify_title};

    #[test]
    fn test_point_id_is_stable() {
        let url = "https://en.wikipedia.org/wiki/Cliffs_of_Moher";
        let first = PointId::from_url(url);
        assert_eq!(first, PointId::from_url(url));
        assert_ne!(first, PointId::from_url("https://en.wikipedia.org/wiki/Burren"));
    }

    #[test]
    fn test_point_id_known_value() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(PointId::from_url("abc"), PointId(0xba7816bf8f01cfea));
    }

    #[test]
    fn test_record_id_follows_url() {
        let payload = PagePayload::origin(
            "https://en.wikipedia.org/wiki/Galway",
            "Galway",
            "A city in the west",
            classify("Galway", "A city in the west"),
        );
        let record = PageRecord::new(vec![0.1, 0.2], payload);
        assert_eq!(
            record.id,
            PointId::from_url("https://en.wikipedia.org/wiki/Galway")
        );
    }

    #[test]
    fn test_payload_json_shape() {
        let content = "Bunratty Castle in County Clare, a tourist attraction with a gift shop.";
        let payload = PagePayload::origin(
            "https://en.wikipedia.org/wiki/Bunratty_Castle",
            "Bunratty Castle",
            content,
            classify("Bunratty Castle", content),
        );
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["type"], "origin");
        assert_eq!(json["location_type"], "historical");
        assert_eq!(json["attraction_category"], "heritage");
        assert_eq!(json["county"], "Clare");
        assert_eq!(json["features"][0], "gift_shop");
        assert_eq!(json["tourism_related"], true);
        assert!(json.get("context").is_none());
        assert!(json["last_updated"].as_str().unwrap().contains('T'));

        let back: PagePayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_lightweight_payload() {
        let payload = PagePayload::lightweight(
            "https://en.wikipedia.org/wiki/Lough_Derg",
            "Lough Derg",
            LinkKind::Place,
            "Lough Derg is a lake on the Shannon.",
            classify_title("Lough Derg"),
        );
        assert_eq!(payload.kind, RecordKind::Place);
        assert!(payload.kind.is_candidate());
        assert!(payload.content.is_empty());
        assert_eq!(
            payload.context.as_deref(),
            Some("Lough Derg is a lake on the Shannon.")
        );
    }

    #[test]
    fn test_sparse_payload_defaults() {
        let payload: PagePayload = serde_json::from_value(serde_json::json!({
            "title": "Croagh Patrick",
            "url": "https://en.wikipedia.org/wiki/Croagh_Patrick",
            "type": "attraction",
            "context": "a mountain in Mayo"
        }))
        .unwrap();
        assert_eq!(payload.location_type, LocationType::Unknown);
        assert!(payload.features.is_empty());
        assert!(!payload.tourism_related);
    }
}
