//! Page fetching with a minimum delay between requests
//!
//! A failed fetch is never an error for the caller: non-2xx responses,
//! network errors and timeouts are logged and come back as `None`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use tracing::{Instrument, debug, debug_span, instrument, warn};
use url::Url;

use super::config::CrawlerConfig;
use super::error::CrawlError;

/// Anything that can turn a URL into page HTML
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

impl<T: PageSource> PageSource for &T {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<String>> + Send {
        (**self).fetch(url)
    }
}

/// HTTP `PageSource` over `reqwest`, throttled by a `governor` limiter
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl PageFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            limiter: limiter(config.fetch_delay),
        })
    }
}

/// One permit per `delay`, no burst; `None` when there is no delay
fn limiter(delay: Duration) -> Option<Arc<DefaultDirectRateLimiter>> {
    Quota::with_period(delay).map(|quota| Arc::new(RateLimiter::direct(quota)))
}

impl PageSource for PageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Option<String> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().instrument(debug_span!("limiter")).await;
        }

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Failed to fetch {}: HTTP {}", url, status);
            return None;
        }

        match response.text().await {
            Ok(body) => {
                debug!("Fetched {} ({} bytes)", url, body.len());
                Some(body)
            }
            Err(e) => {
                warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }
}
