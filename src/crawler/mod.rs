//! Wikipedia crawler for the place index
//!
//! This module walks Wikipedia breadth-first from a list of seed titles,
//! classifies each article, and writes it to a vector index along with
//! lightweight records for the place and attraction links it mentions.
//!
//! ## Key Components
//!
//! - `Crawler`: the frontier loop, generic over fetcher, embedder and store
//! - `PageFetcher`: rate-limited HTTP page source
//! - `extract_page` / `extract_links`: best-effort HTML extraction
//! - `CrawlerConfig`: depth bound, delays and store retry policy
//! - `START_TITLES`: the built-in Ireland seed list

mod config;
mod content_extraction;
mod error;
mod fetcher;
mod links;
mod orchestrator;
mod seeds;

pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use content_extraction::{ExtractedPage, extract_page, title_from_slug, title_from_url, wiki_url};
pub use error::CrawlError;
pub use fetcher::{PageFetcher, PageSource};
pub use links::{LinkCandidate, extract_links};
pub use orchestrator::{CrawlEvent, CrawlSummary, Crawler, EntryOutcome, FrontierEntry};
pub use seeds::START_TITLES;
