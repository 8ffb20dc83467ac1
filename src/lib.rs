//! # wikiatlas - Wikipedia place crawler and vector index
//!
//! This crate crawls Wikipedia breadth-first from a list of seed titles,
//! keeps the pages and links that describe places or tourist attractions,
//! classifies them with keyword rules, embeds them, and stores them in a
//! vector index for filtered semantic search.
//!
//! ## Features
//!
//! - Data-driven classification of location type, attraction category,
//!   features, price range, opening hours, county and region
//! - Embedding through any `rig` embedding model (Ollama by default) behind
//!   a rate limiter, or a deterministic hashing embedder for offline use
//! - Vector storage in Qdrant over its REST API or in a local libsql database
//! - Deduplication by a URL-derived point id, so interrupted crawls resume
//!   without refetching
//! - Conjunctive filters over every stored classification field
//!
//! ## Example
//!
//! ```rust,no_run
//! use wikiatlas::crawler::{Crawler, CrawlerConfig, PageFetcher};
//! use wikiatlas::index::{LibsqlStore, VectorStore};
//! use wikiatlas::model::HashingEmbedder;
//! use wikiatlas::search::{SearchFilter, SearchSystem};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = HashingEmbedder::new(384);
//!     let store = LibsqlStore::new_from_path("places.db", "ireland_places", 384).await?;
//!     store.ensure_collection().await?;
//!
//!     let config = CrawlerConfig::builder().max_depth(2).build();
//!     let fetcher = PageFetcher::new(&config)?;
//!     let crawler = Crawler::new(config, fetcher, &embedder, &store);
//!     let summary = crawler.crawl(["County Clare"]).await?;
//!     println!("stored {} pages", summary.stored_origins);
//!
//!     let search = SearchSystem::new(&embedder, &store);
//!     for hit in search.search("castles", 5, &SearchFilter::new().county("Clare")).await? {
//!         println!("{} {}", hit.payload.title, hit.score);
//!     }
//!     Ok(())
//! }
//! ```

mod error;

pub mod classifier;
pub mod crawler;
pub mod index;
pub mod model;
pub mod retry;
pub mod search;

pub use error::{Error, Result};

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
