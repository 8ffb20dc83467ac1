//! Breadth-first crawl over Wikipedia titles
//!
//! The `Crawler` pops `(title, depth)` entries off a FIFO frontier. Each entry
//! goes through two named steps, always in this order:
//!
//! 1. `check_identity`: depth bound and an index lookup by the URL-derived id.
//!    Nothing is fetched or embedded for an entry that fails this step.
//! 2. `fetch_and_store`: fetch, classify, embed and upsert the page, then
//!    record every new link candidate as a lightweight, title-embedded point
//!    and queue it one level deeper.
//!
//! A problem with one entry is logged and the crawl moves on. Only repeated
//! store failures end the crawl early.

use std::collections::VecDeque;
use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::config::CrawlerConfig;
use super::content_extraction::{extract_page, wiki_url};
use super::error::CrawlError;
use super::fetcher::PageSource;
use super::links::{LinkCandidate, extract_links};
use crate::classifier::{classify, classify_title};
use crate::index::{PagePayload, PageRecord, StoreError, VectorStore};
use crate::model::Embedder;

/// A pending title in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub title: String,
    /// Seeds start at 1
    pub depth: u32,
}

impl FrontierEntry {
    pub fn seed(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            depth: 1,
        }
    }
}

/// Terminal state of a frontier entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Page stored, along with this many new link candidates
    Stored { candidates: usize },
    SkippedDuplicate,
    SkippedDepth,
    SkippedFetchFailed,
    SkippedError,
}

/// Progress reported while crawling
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    Started {
        seeds: usize,
    },
    EntryFinished {
        title: String,
        url: String,
        depth: u32,
        outcome: EntryOutcome,
        frontier: usize,
        visited: usize,
    },
    Finished(CrawlSummary),
}

/// Totals for a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Frontier entries popped
    pub visited: usize,
    pub stored_origins: usize,
    pub stored_candidates: usize,
    pub skipped_duplicate: usize,
    pub skipped_depth: usize,
    pub skipped_fetch_failed: usize,
    pub skipped_error: usize,
}

impl CrawlSummary {
    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Stored { candidates } => {
                self.stored_origins += 1;
                self.stored_candidates += candidates;
            }
            EntryOutcome::SkippedDuplicate => self.skipped_duplicate += 1,
            EntryOutcome::SkippedDepth => self.skipped_depth += 1,
            EntryOutcome::SkippedFetchFailed => self.skipped_fetch_failed += 1,
            EntryOutcome::SkippedError => self.skipped_error += 1,
        }
    }
}

/// Result of the identity step
enum Identity {
    Proceed,
    Skip(EntryOutcome),
}

/// Breadth-first crawler over its injected collaborators
pub struct Crawler<F, E, S> {
    config: CrawlerConfig,
    fetcher: F,
    embedder: E,
    store: S,
    events: Option<mpsc::Sender<CrawlEvent>>,
}

impl<F, E, S> Crawler<F, E, S>
where
    F: PageSource,
    E: Embedder,
    S: VectorStore,
{
    pub fn new(config: CrawlerConfig, fetcher: F, embedder: E, store: S) -> Self {
        Self {
            config,
            fetcher,
            embedder,
            store,
            events: None,
        }
    }

    /// Report progress on `sender` as well as in the log
    pub fn with_events(mut self, sender: mpsc::Sender<CrawlEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    async fn emit(&self, event: CrawlEvent) {
        if let Some(sender) = &self.events {
            // a dropped receiver only means nobody is watching
            let _ = sender.send(event).await;
        }
    }

    /// Crawl from `seeds` until the frontier is empty
    ///
    /// Returns `CrawlError::StoreUnavailable` when the configured number of
    /// consecutive entries failed on the index.
    #[instrument(skip_all, fields(max_depth = self.config.max_depth))]
    pub async fn crawl<I, T>(&self, seeds: I) -> Result<CrawlSummary, CrawlError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut frontier: VecDeque<FrontierEntry> =
            seeds.into_iter().map(FrontierEntry::seed).collect();
        let mut summary = CrawlSummary::default();
        let mut store_failures = 0u32;

        info!("Starting crawl with {} seeds", frontier.len());
        self.emit(CrawlEvent::Started {
            seeds: frontier.len(),
        })
        .await;

        while let Some(entry) = frontier.pop_front() {
            let url = wiki_url(&self.config.base_url, &entry.title);
            summary.visited += 1;

            let outcome = match self.process_entry(&entry, &url, &mut frontier).await {
                Ok(outcome) => {
                    store_failures = 0;
                    outcome
                }
                Err(CrawlError::Store(e)) => {
                    store_failures += 1;
                    warn!(
                        "Store failure on {} ({}/{}): {}",
                        url, store_failures, self.config.max_consecutive_store_failures, e
                    );
                    if store_failures >= self.config.max_consecutive_store_failures {
                        return Err(CrawlError::StoreUnavailable {
                            failures: store_failures,
                            last: e.to_string(),
                        });
                    }
                    EntryOutcome::SkippedError
                }
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    EntryOutcome::SkippedError
                }
            };
            summary.record(outcome);

            info!(
                "Depth {}: {} => {} ({:?}); frontier {}, visited {}",
                entry.depth,
                entry.title,
                url,
                outcome,
                frontier.len(),
                summary.visited
            );
            self.emit(CrawlEvent::EntryFinished {
                title: entry.title,
                url,
                depth: entry.depth,
                outcome,
                frontier: frontier.len(),
                visited: summary.visited,
            })
            .await;

            if !self.config.pop_delay.is_zero() {
                tokio::time::sleep(self.config.pop_delay).await;
            }
        }

        info!(
            "Crawl finished: {} visited, {} pages and {} candidates stored",
            summary.visited, summary.stored_origins, summary.stored_candidates
        );
        self.emit(CrawlEvent::Finished(summary.clone())).await;
        Ok(summary)
    }

    async fn process_entry(
        &self,
        entry: &FrontierEntry,
        url: &str,
        frontier: &mut VecDeque<FrontierEntry>,
    ) -> Result<EntryOutcome, CrawlError> {
        match self.check_identity(entry, url).await? {
            Identity::Skip(outcome) => Ok(outcome),
            Identity::Proceed => self.fetch_and_store(entry, url, frontier).await,
        }
    }

    /// Step one: decide from depth and the index alone whether to fetch
    async fn check_identity(&self, entry: &FrontierEntry, url: &str) -> Result<Identity, CrawlError> {
        if entry.depth > self.config.max_depth {
            return Ok(Identity::Skip(EntryOutcome::SkippedDepth));
        }

        let stored = self
            .with_retry("record lookup", || self.store.record_kind(url))
            .await?;
        match stored {
            Some(kind) if !self.config.expand_candidates || !kind.is_candidate() => {
                debug!("{} already stored as {}", url, kind);
                return Ok(Identity::Skip(EntryOutcome::SkippedDuplicate));
            }
            _ => {}
        }

        if !self.config.should_fetch(entry.depth) {
            return Ok(Identity::Skip(EntryOutcome::SkippedDepth));
        }
        Ok(Identity::Proceed)
    }

    /// Step two: fetch the page, store it and its new link candidates
    async fn fetch_and_store(
        &self,
        entry: &FrontierEntry,
        url: &str,
        frontier: &mut VecDeque<FrontierEntry>,
    ) -> Result<EntryOutcome, CrawlError> {
        let Some(html) = self.fetcher.fetch(url).await else {
            return Ok(EntryOutcome::SkippedFetchFailed);
        };

        let page = extract_page(url, &html, self.config.content_chars);
        let candidates = extract_links(&html, &self.config.base_url, self.config.context_chars);
        let classification = classify(&page.title, &page.content);

        let text = if page.content.is_empty() {
            &page.title
        } else {
            &page.content
        };
        let vector = self.embedder.embed(text).await?;
        let record = PageRecord::new(
            vector,
            PagePayload::origin(url, page.title, page.content, classification),
        );
        self.with_retry("upsert", || self.store.upsert(&record))
            .await?;

        let mut stored = 0;
        for candidate in &candidates {
            match self.store_candidate(candidate, entry.depth, frontier).await {
                Ok(true) => stored += 1,
                Ok(false) => {}
                Err(e @ CrawlError::Store(_)) => return Err(e),
                Err(e) => warn!("Skipping link {}: {}", candidate.url, e),
            }
        }

        debug!(
            "{} links on {}, {} new candidates",
            candidates.len(),
            url,
            stored
        );
        Ok(EntryOutcome::Stored { candidates: stored })
    }

    /// Record a link as a lightweight point embedded from its title only
    async fn store_candidate(
        &self,
        candidate: &LinkCandidate,
        depth: u32,
        frontier: &mut VecDeque<FrontierEntry>,
    ) -> Result<bool, CrawlError> {
        let exists = self
            .with_retry("exists", || self.store.exists(&candidate.url))
            .await?;
        if exists {
            return Ok(false);
        }

        let vector = self.embedder.embed(&candidate.title).await?;
        let record = PageRecord::new(
            vector,
            PagePayload::lightweight(
                candidate.url.as_str(),
                candidate.title.as_str(),
                candidate.kind,
                candidate.context.as_str(),
                classify_title(&candidate.title),
            ),
        );
        self.with_retry("upsert", || self.store.upsert(&record))
            .await?;

        if self.config.should_enqueue(depth) {
            frontier.push_back(FrontierEntry {
                title: candidate.title.clone(),
                depth: depth + 1,
            });
        }
        Ok(true)
    }

    async fn with_retry<T, Op, Fut>(&self, what: &str, op: Op) -> Result<T, CrawlError>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        Ok(self.config.store_retry.run(what, op).await?)
    }
}
