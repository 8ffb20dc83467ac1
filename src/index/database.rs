//! Local libsql backend for the vector index
//!
//! Filtering happens in SQL over indexed columns; similarity is computed in
//! process over the rows that pass the filter.

use crate::index::error::StoreError;
use crate::index::filter::{FieldValue, Predicate, SearchFilter};
use crate::index::schema;
use crate::index::{PagePayload, PageRecord, PointId, RecordKind, SearchHit, StoredPoint, VectorStore};
use crate::model::embedding::{cosine_similarity, from_binary, to_binary};
use libsql::{Connection, Rows, Value, params};
use tracing::{debug, info, instrument};

/// `VectorStore` backed by a local libsql database
#[derive(Clone)]
pub struct LibsqlStore {
    conn: Connection,
    collection: String,
    dimension: usize,
}

impl LibsqlStore {
    /// Wrap an open connection and make sure the tables exist
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection, collection: &str, dimension: usize) -> Result<Self, StoreError> {
        schema::initialize_schema(&conn).await?;

        Ok(Self {
            conn,
            collection: collection.to_string(),
            dimension,
        })
    }

    /// Open (or create) a database file
    pub async fn new_from_path(
        path: &str,
        collection: &str,
        dimension: usize,
    ) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn, collection, dimension).await
    }

    /// Execute a custom query with parameters
    pub async fn execute_query<P>(&self, sql: &str, params: P) -> Result<Rows, StoreError>
    where
        P: libsql::params::IntoParams,
    {
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to execute query: {}", e)))
    }

    async fn stored_dimension(&self) -> Result<Option<usize>, StoreError> {
        let mut rows = self
            .execute_query(
                "SELECT dimension FROM collections WHERE name = ?",
                params![self.collection.clone()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => {
                let dimension: i64 = row.get(0)?;
                Ok(Some(dimension as usize))
            }
            None => Ok(None),
        }
    }
}

fn text_or_null(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.to_string()))
}

/// Render a filter as an SQL condition over `pages` plus its parameters
fn sql_filter(collection: &str, filter: &SearchFilter) -> (String, Vec<Value>) {
    let mut clauses = vec!["collection = ?".to_string()];
    let mut values = vec![Value::Text(collection.to_string())];

    for predicate in filter.predicates() {
        match predicate {
            Predicate::Equals {
                field,
                value: FieldValue::Keyword(value),
            } => {
                let column = if field == "type" { "kind" } else { field };
                clauses.push(format!("{} = ?", column));
                values.push(Value::Text(value));
            }
            Predicate::Equals {
                field,
                value: FieldValue::Bool(value),
            } => {
                clauses.push(format!("{} = ?", field));
                values.push(Value::Integer(value as i64));
            }
            Predicate::Contains { value, .. } => {
                clauses.push(
                    "id IN (SELECT page_id FROM page_features WHERE collection = ? AND feature = ?)"
                        .to_string(),
                );
                values.push(Value::Text(collection.to_string()));
                values.push(Value::Text(value));
            }
            Predicate::NotEmpty { field } => {
                clauses.push(format!("{field} IS NOT NULL AND {field} != ''"));
            }
        }
    }

    (clauses.join(" AND "), values)
}

impl VectorStore for LibsqlStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut rows = self.execute_query("SELECT 1", params![]).await?;
        rows.next().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn ensure_collection(&self) -> Result<(), StoreError> {
        match self.stored_dimension().await? {
            Some(dimension) if dimension == self.dimension => Ok(()),
            Some(dimension) => Err(StoreError::Schema(format!(
                "collection {} has vector size {}, expected {}",
                self.collection, dimension, self.dimension
            ))),
            None => {
                self.conn
                    .execute(
                        "INSERT INTO collections (name, dimension, created_at) VALUES (?, ?, ?)",
                        params![
                            self.collection.clone(),
                            self.dimension as i64,
                            chrono::Utc::now().to_rfc3339(),
                        ],
                    )
                    .await
                    .map_err(|e| StoreError::Query(format!("Failed to create collection: {}", e)))?;
                info!(
                    "Created collection {} ({} dimensions)",
                    self.collection, self.dimension
                );
                Ok(())
            }
        }
    }

    async fn retrieve(&self, url: &str) -> Result<Option<StoredPoint>, StoreError> {
        let id = PointId::from_url(url);
        let mut rows = self
            .execute_query(
                "SELECT payload FROM pages WHERE collection = ? AND id = ?",
                params![self.collection.clone(), id.0 as i64],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let payload: String = row.get(0)?;
                let payload: PagePayload = serde_json::from_str(&payload)
                    .map_err(|e| StoreError::Data(format!("Failed to decode payload: {}", e)))?;
                Ok(Some(StoredPoint { id, payload }))
            }
            None => Ok(None),
        }
    }

    async fn record_kind(&self, url: &str) -> Result<Option<RecordKind>, StoreError> {
        let mut rows = self
            .execute_query(
                "SELECT kind FROM pages WHERE collection = ? AND id = ?",
                params![self.collection.clone(), PointId::from_url(url).0 as i64],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let kind: String = row.get(0)?;
                kind.parse().map(Some).map_err(StoreError::Data)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, record), fields(id = %record.id, url = %record.payload.url))]
    async fn upsert(&self, record: &PageRecord) -> Result<(), StoreError> {
        if record.vector.len() != self.dimension {
            return Err(StoreError::Data(format!(
                "vector has {} dimensions, collection expects {}",
                record.vector.len(),
                self.dimension
            )));
        }
        let payload = &record.payload;
        let id = record.id.0 as i64;

        let tx = self.conn.transaction().await?;

        tx.execute(
            "INSERT INTO pages (collection, id, url, title, kind, location_type, attraction_category,
                                county, region, tourism_related, price_range, opening_hours,
                                embedding, payload, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(collection, id) DO UPDATE SET
             url = excluded.url,
             title = excluded.title,
             kind = excluded.kind,
             location_type = excluded.location_type,
             attraction_category = excluded.attraction_category,
             county = excluded.county,
             region = excluded.region,
             tourism_related = excluded.tourism_related,
             price_range = excluded.price_range,
             opening_hours = excluded.opening_hours,
             embedding = excluded.embedding,
             payload = excluded.payload,
             last_updated = excluded.last_updated",
            vec![
                Value::Text(self.collection.clone()),
                Value::Integer(id),
                Value::Text(payload.url.clone()),
                Value::Text(payload.title.clone()),
                Value::Text(payload.kind.as_str().to_string()),
                Value::Text(payload.location_type.as_str().to_string()),
                Value::Text(payload.attraction_category.as_str().to_string()),
                text_or_null(payload.county.as_deref()),
                text_or_null(payload.region.as_deref()),
                Value::Integer(payload.tourism_related as i64),
                text_or_null(payload.price_range.as_deref()),
                text_or_null(payload.opening_hours.as_deref()),
                Value::Blob(to_binary(&record.vector)),
                Value::Text(serde_json::to_string(payload)?),
                Value::Text(payload.last_updated.to_rfc3339()),
            ],
        )
        .await
        .map_err(|e| StoreError::Query(format!("Failed to upsert page: {}", e)))?;

        tx.execute(
            "DELETE FROM page_features WHERE collection = ? AND page_id = ?",
            params![self.collection.clone(), id],
        )
        .await
        .map_err(|e| StoreError::Query(format!("Failed to clear features: {}", e)))?;

        for feature in &payload.features {
            tx.execute(
                "INSERT OR IGNORE INTO page_features (collection, page_id, feature) VALUES (?, ?, ?)",
                params![self.collection.clone(), id, feature.clone()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to add feature: {}", e)))?;
        }

        tx.commit().await?;
        debug!("Stored {} ({})", payload.title, payload.kind);
        Ok(())
    }

    #[instrument(skip(self, vector, filter))]
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let (condition, values) = sql_filter(&self.collection, filter);
        let sql = format!("SELECT id, embedding, payload FROM pages WHERE {}", condition);
        let mut rows = self.execute_query(&sql, values).await?;

        let mut hits = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: i64 = row.get(0)?;
            let embedding: Vec<u8> = row.get(1)?;
            let payload: String = row.get(2)?;
            let payload: PagePayload = serde_json::from_str(&payload)
                .map_err(|e| StoreError::Data(format!("Failed to decode payload: {}", e)))?;

            hits.push(SearchHit {
                id: PointId(id as u64),
                score: cosine_similarity(vector, &from_binary(&embedding)),
                payload,
            });
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .execute_query(
                "SELECT COUNT(*) FROM pages WHERE collection = ?",
                params![self.collection.clone()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => {
                let count: i64 = row.get(0)?;
                Ok(count as u64)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{LinkKind, LocationType, classify, classify_title};
    use crate::model::HashingEmbedder;

    use tempfile::tempdir;

    const DIMS: usize = 64;

    async fn setup_test_db() -> Result<(LibsqlStore, tempfile::TempDir), StoreError> {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();

        let store = LibsqlStore::new_from_path(&db_path, "places", DIMS).await?;
        store.ensure_collection().await?;

        Ok((store, temp_dir))
    }

    fn origin(embedder: &HashingEmbedder, title: &str, content: &str) -> PageRecord {
        let payload = PagePayload::origin(
            format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            title,
            content,
            classify(title, content),
        );
        PageRecord::new(embedder.vector(content), payload)
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (store, _temp_dir) = setup_test_db().await.unwrap();

        let mut result = store
            .execute_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('collections', 'pages', 'page_features')",
                params![],
            )
            .await
            .unwrap();

        let mut tables = Vec::new();
        while let Ok(Some(row)) = result.next().await {
            let table_name: String = row.get(0).unwrap();
            tables.push(table_name);
        }

        assert_eq!(tables.len(), 3);
        assert!(tables.contains(&"pages".to_string()));
    }

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent() {
        let (store, temp_dir) = setup_test_db().await.unwrap();
        store.ensure_collection().await.unwrap();
        store.ensure_collection().await.unwrap();

        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();
        let wider = LibsqlStore::new_from_path(&db_path, "places", DIMS * 2)
            .await
            .unwrap();
        assert!(matches!(
            wider.ensure_collection().await,
            Err(StoreError::Schema(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let (store, _temp_dir) = setup_test_db().await.unwrap();
        let embedder = HashingEmbedder::new(DIMS);
        let url = "https://en.wikipedia.org/wiki/Lough_Derg";

        let candidate = PageRecord::new(
            embedder.vector("Lough Derg"),
            PagePayload::lightweight(
                url,
                "Lough Derg",
                LinkKind::Place,
                "a lake",
                classify_title("Lough Derg"),
            ),
        );
        store.upsert(&candidate).await.unwrap();
        assert_eq!(store.record_kind(url).await.unwrap(), Some(RecordKind::Place));

        let content = "Lough Derg is a lake in County Tipperary with scenic views.";
        let full = PageRecord::new(
            embedder.vector(content),
            PagePayload::origin(url, "Lough Derg", content, classify("Lough Derg", content)),
        );
        store.upsert(&full).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store.retrieve(url).await.unwrap().unwrap();
        assert_eq!(stored.id, PointId::from_url(url));
        assert_eq!(stored.payload.kind, RecordKind::Origin);
        assert_eq!(stored.payload.content, content);
        assert_eq!(stored.payload.features, vec!["scenic_views".to_string()]);
        assert!(store.exists(url).await.unwrap());
        assert!(
            !store
                .exists("https://en.wikipedia.org/wiki/Elsewhere")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_upsert_rejects_wrong_dimension() {
        let (store, _temp_dir) = setup_test_db().await.unwrap();
        let record = PageRecord::new(
            vec![1.0; DIMS + 1],
            PagePayload::origin("https://x", "X", "", classify("X", "")),
        );
        assert!(matches!(store.upsert(&record).await, Err(StoreError::Data(_))));
    }

    #[tokio::test]
    async fn test_search_filter_conjunction() {
        let (store, _temp_dir) = setup_test_db().await.unwrap();
        let embedder = HashingEmbedder::new(DIMS);
        for (title, content) in [
            ("Dublin", "Dublin is a city in County Dublin with museums."),
            ("Malahide Castle", "A castle in County Dublin with guided tours."),
            ("Cork", "Cork is a city in County Cork with a market."),
            ("Howth", "A village in County Dublin by the sea."),
        ] {
            store.upsert(&origin(&embedder, title, content)).await.unwrap();
        }

        let query = embedder.vector("city");
        let hits = store
            .search(
                &query,
                10,
                &SearchFilter::new()
                    .county("Dublin")
                    .location_type(LocationType::City),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.title, "Dublin");

        let all = store.search(&query, 10, &SearchFilter::new()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));

        let limited = store.search(&query, 2, &SearchFilter::new()).await.unwrap();
        assert_eq!(limited.len(), 2);

        let toured = store
            .search(&query, 10, &SearchFilter::new().feature("guided_tours"))
            .await
            .unwrap();
        assert_eq!(toured.len(), 1);
        assert_eq!(toured[0].payload.title, "Malahide Castle");
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let (store, temp_dir) = setup_test_db().await.unwrap();
        let embedder = HashingEmbedder::new(DIMS);
        store
            .upsert(&origin(&embedder, "Galway", "A city"))
            .await
            .unwrap();

        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();
        let other = LibsqlStore::new_from_path(&db_path, "other", DIMS)
            .await
            .unwrap();
        other.ensure_collection().await.unwrap();
        assert_eq!(other.count().await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
