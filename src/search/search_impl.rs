//! Filtered similarity search over the place index

use std::fmt::Write as _;

use tracing::{debug, instrument};

use super::error::SearchError;
use crate::index::{SearchFilter, SearchHit, VectorStore};
use crate::model::Embedder;

/// Number of hits returned when the caller does not ask for a limit
pub const DEFAULT_LIMIT: usize = 5;

/// Embeds queries and runs them against a vector index
pub struct SearchSystem<E, S> {
    embedder: E,
    store: S,
}

impl<E, S> SearchSystem<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    pub fn new(embedder: E, store: S) -> Self {
        Self { embedder, store }
    }

    /// Up to `limit` records similar to `query` that satisfy every predicate
    /// of `filter`, best first
    ///
    /// An empty filter ranks the whole collection.
    #[instrument(skip(self, filter), fields(predicates = filter.predicates().len()))]
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidParameters(
                "query must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(SearchError::InvalidParameters(
                "limit must be at least 1".to_string(),
            ));
        }

        let vector = self.embedder.embed(query).await?;
        let hits = self.store.search(&vector, limit, filter).await?;
        debug!("{} hits for {:?}", hits.len(), query);
        Ok(hits)
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Human-readable block for one hit, as printed by the CLI
pub fn render_hit(hit: &SearchHit) -> String {
    let payload = &hit.payload;
    let mut out = format!("- {} ({:.3})\n", payload.title, hit.score);
    let _ = writeln!(
        out,
        "  Type: {}, location: {}, category: {}",
        payload.kind, payload.location_type, payload.attraction_category
    );
    if let Some(county) = &payload.county {
        let _ = writeln!(out, "  County: {}", county);
    }
    if let Some(region) = &payload.region {
        let _ = writeln!(out, "  Region: {}", region);
    }
    if !payload.features.is_empty() {
        let _ = writeln!(out, "  Features: {}", payload.features.join(", "));
    }
    if let Some(price) = &payload.price_range {
        let _ = writeln!(out, "  Price: {}", price);
    }
    if let Some(hours) = &payload.opening_hours {
        let _ = writeln!(out, "  Hours: {}", hours);
    }
    let _ = write!(out, "  URL: {}", payload.url);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{LocationType, classify};
    use crate::index::{LibsqlStore, PagePayload, PageRecord, RecordKind};
    use crate::model::{EmbedError, HashingEmbedder};
    use tempfile::TempDir;

    const DIMS: usize = 64;

    const PAGES: &[(&str, &str)] = &[
        (
            "Dublin",
            "Dublin is the capital city of Ireland, in County Dublin on the east coast.",
        ),
        (
            "Malahide Castle",
            "Malahide Castle is a medieval castle in County Dublin. Guided tours daily.",
        ),
        (
            "Cork (city)",
            "Cork is the second largest city, in County Cork in the south.",
        ),
    ];

    struct DownEmbedder;

    impl Embedder for DownEmbedder {
        fn ndims(&self) -> usize {
            DIMS
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::Other("model not loaded".to_string()))
        }
    }

    async fn indexed() -> (SearchSystem<HashingEmbedder, LibsqlStore>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.db").to_string_lossy().to_string();
        let store = LibsqlStore::new_from_path(&path, "places", DIMS).await.unwrap();
        store.ensure_collection().await.unwrap();

        let embedder = HashingEmbedder::new(DIMS);
        for (title, content) in PAGES {
            let url = format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"));
            let payload = PagePayload::origin(url, *title, *content, classify(title, content));
            store
                .upsert(&PageRecord::new(embedder.vector(content), payload))
                .await
                .unwrap();
        }
        (SearchSystem::new(embedder, store), dir)
    }

    #[tokio::test]
    async fn test_unfiltered_search_ranks_everything() {
        let (search, _dir) = indexed().await;
        let hits = search
            .search(PAGES[0].1, 10, &SearchFilter::default())
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].payload.title, "Dublin");
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let (search, _dir) = indexed().await;

        let filter = SearchFilter::new()
            .county("Dublin")
            .location_type(LocationType::City);
        let hits = search.search("capital city", 10, &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.title, "Dublin");

        let dublin = search
            .search("castle", 10, &SearchFilter::new().county("Dublin"))
            .await
            .unwrap();
        assert_eq!(dublin.len(), 2);
        assert!(
            dublin
                .iter()
                .all(|hit| hit.payload.county.as_deref() == Some("Dublin"))
        );

        let tours = search
            .search(
                "castle",
                10,
                &SearchFilter::new()
                    .kind(RecordKind::Origin)
                    .feature("guided_tours"),
            )
            .await
            .unwrap();
        assert_eq!(tours.len(), 1);
        assert_eq!(tours[0].payload.title, "Malahide Castle");
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let (search, _dir) = indexed().await;
        let hits = search
            .search("city", 2, &SearchFilter::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let (search, _dir) = indexed().await;
        assert!(matches!(
            search.search("  ", 5, &SearchFilter::default()).await,
            Err(SearchError::InvalidParameters(_))
        ));
        assert!(matches!(
            search.search("castles", 0, &SearchFilter::default()).await,
            Err(SearchError::InvalidParameters(_))
        ));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_reported() {
        let (indexed, _dir) = indexed().await;
        let search = SearchSystem::new(DownEmbedder, indexed.store());
        assert!(matches!(
            search.search("castles", 5, &SearchFilter::default()).await,
            Err(SearchError::Embedding(_))
        ));
    }

    #[test]
    fn test_render_hit() {
        let content = "A castle in County Cork. Free admission, wheelchair access.";
        let hit = SearchHit {
            id: crate::index::PointId(7),
            score: 0.8126,
            payload: PagePayload::origin(
                "https://en.wikipedia.org/wiki/Blarney_Castle",
                "Blarney Castle",
                content,
                classify("Blarney Castle", content),
            ),
        };

        let text = render_hit(&hit);
        assert!(text.starts_with("- Blarney Castle (0.813)\n"));
        assert!(text.contains("  County: Cork\n"));
        assert!(text.contains("  Region: Southwest\n"));
        assert!(text.contains("  Price: free\n"));
        assert!(text.ends_with("  URL: https://en.wikipedia.org/wiki/Blarney_Castle"));
    }
}
