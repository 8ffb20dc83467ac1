//! # Crawler Configuration Module
//!
//! Configuration for the breadth-first crawl, with a builder for the knobs
//! callers usually touch.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: crawl depth, delays, timeouts and store failure policy
//! - `CrawlerConfigBuilder`: builder pattern implementation for easier configuration
//!
//! The defaults are polite towards Wikipedia: at most one request per second
//! from the fetcher and a two second pause after every frontier entry.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Deepest frontier level that is still processed; seeds sit at depth 1
    pub max_depth: u32,

    /// Minimum spacing between two fetches
    pub fetch_delay: Duration,

    /// Pause after every frontier entry, whatever its outcome
    pub pop_delay: Duration,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// Site the relative `/wiki/` links and seed titles resolve against
    pub base_url: String,

    /// Characters of page text kept in the payload
    pub content_chars: usize,

    /// Characters of paragraph context kept for a link candidate
    pub context_chars: usize,

    /// Fetch link candidates on their own turn instead of only recording them
    pub expand_candidates: bool,

    /// Consecutive failed store operations tolerated before the crawl aborts
    pub max_consecutive_store_failures: u32,

    /// Retry policy around each store operation
    pub store_retry: RetryPolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            fetch_delay: Duration::from_millis(1000),
            pop_delay: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("wikiatlas-crawler/{}", env!("CARGO_PKG_VERSION")),
            base_url: "https://en.wikipedia.org".to_string(),
            content_chars: 2000,
            context_chars: 200,
            expand_candidates: false,
            max_consecutive_store_failures: 3,
            store_retry: RetryPolicy::operation(),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn fetch_delay(mut self, fetch_delay: Duration) -> Self {
        self.config.fetch_delay = fetch_delay;
        self
    }

    pub fn pop_delay(mut self, pop_delay: Duration) -> Self {
        self.config.pop_delay = pop_delay;
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.request_timeout = request_timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn expand_candidates(mut self, expand_candidates: bool) -> Self {
        self.config.expand_candidates = expand_candidates;
        self
    }

    pub fn max_consecutive_store_failures(mut self, failures: u32) -> Self {
        self.config.max_consecutive_store_failures = failures;
        self
    }

    pub fn store_retry(mut self, store_retry: RetryPolicy) -> Self {
        self.config.store_retry = store_retry;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Whether an entry at `depth` gets fetched
    pub fn should_fetch(&self, depth: u32) -> bool {
        if self.expand_candidates {
            depth <= self.max_depth
        } else {
            depth < self.max_depth
        }
    }

    /// Whether links found on a page at `depth` are queued
    pub fn should_enqueue(&self, depth: u32) -> bool {
        !self.expand_candidates || depth < self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.fetch_delay, Duration::from_millis(1000));
        assert_eq!(config.pop_delay, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.content_chars, 2000);
        assert!(!config.expand_candidates);
        assert_eq!(config.store_retry, RetryPolicy::operation());
    }

    #[test]
    fn test_builder() {
        let config = CrawlerConfig::builder()
            .max_depth(3)
            .pop_delay(Duration::ZERO)
            .base_url("http://localhost:1234/")
            .expand_candidates(true)
            .build();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.pop_delay, Duration::ZERO);
        assert_eq!(config.base_url, "http://localhost:1234");
        assert!(config.expand_candidates);
    }

    #[test]
    fn test_depth_gates() {
        let literal = CrawlerConfig::default();
        assert!(literal.should_fetch(1));
        assert!(!literal.should_fetch(2));
        assert!(literal.should_enqueue(2));

        let expanding = CrawlerConfig::builder().expand_candidates(true).build();
        assert!(expanding.should_fetch(2));
        assert!(!expanding.should_fetch(3));
        assert!(expanding.should_enqueue(1));
        assert!(!expanding.should_enqueue(2));
    }
}
