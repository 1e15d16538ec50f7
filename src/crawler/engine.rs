//! Breadth-first crawl engine
//!
//! Traversal order and bookkeeping: a FIFO frontier seeded with the start
//! URLs, a visited set marking URLs before processing, and a page budget
//! counting accepted pages. Fetch failures skip the URL; language rejection
//! drops the content but the page's outbound links are still followed, so a
//! landing page in another language cannot strand the crawl.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawler::error::CrawlError;
use crate::crawler::extract::{extract_content, extract_links};
use crate::crawler::language::LanguageGate;
use crate::crawler::{CrawlerConfig, PageRecord};

/// Breadth-first, domain-restricted web crawler
pub struct Crawler {
    config: CrawlerConfig,
    client: ReqwestClient,
    gate: LanguageGate,
}

impl Crawler {
    /// Create a crawler for the given configuration
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        let gate = LanguageGate::new(&config.languages)?;

        Ok(Self {
            config,
            client,
            gate,
        })
    }

    /// Crawl from the seed URLs and return the retained pages
    ///
    /// Terminates when the page budget is reached or the frontier runs dry.
    /// The visited set guarantees each URL is fetched at most once, so cyclic
    /// link graphs terminate too. When the budget trips, unfetched URLs stay
    /// in the frontier untouched.
    #[instrument(skip(self, seeds), fields(max_pages = self.config.max_pages))]
    pub async fn crawl(&self, seeds: &[String]) -> Vec<PageRecord> {
        let mut frontier: VecDeque<Url> = seeds
            .iter()
            .filter_map(|seed| match Url::parse(seed) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(seed = %seed, error = %e, "skipping unparseable seed URL");
                    None
                }
            })
            .collect();
        let mut visited: HashSet<String> = HashSet::new();
        let mut records: Vec<PageRecord> = Vec::new();

        while records.len() < self.config.max_pages {
            let Some(url) = frontier.pop_front() else {
                break;
            };

            // Mark before processing so the URL cannot be re-enqueued and
            // fetched again within the run.
            if !visited.insert(url.to_string()) {
                continue;
            }

            let html = match self.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url = %url, error = %e, "fetch failed, skipping URL");
                    continue;
                }
            };

            let text_content = extract_content(&html, &self.config.content_selector);

            if self.gate.accepts(&text_content) {
                debug!(url = %url, chars = text_content.len(), "page accepted");
                records.push(PageRecord::new(url.to_string(), text_content));
            } else {
                debug!(url = %url, "language gate rejected page, following links only");
            }

            // Link discovery happens for rejected pages too.
            for link in extract_links(&html, &url, &self.config.allowed_domains) {
                if !visited.contains(link.as_str()) {
                    frontier.push_back(link);
                }
            }
        }

        info!(pages = records.len(), "crawl finished");
        records
    }

    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}
