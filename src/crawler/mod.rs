//! Website crawler module
//!
//! This module provides the breadth-first, domain-restricted crawler that
//! feeds the analysis pipeline: frontier management, per-run page budget,
//! content and link extraction, and language filtering.

mod engine;
mod error;
mod extract;
mod language;

pub use engine::Crawler;
pub use error::CrawlError;
pub use extract::{domain_allowed, extract_content, extract_links};
pub use language::LanguageGate;

use serde::{Deserialize, Serialize};

use crate::pipeline::ContentCategory;

/// Default number of pages fetched per run
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Default CSS selector for the main content container
pub const DEFAULT_CONTENT_SELECTOR: &str = "div.main-content";

/// A page retained by the crawl, enriched by later pipeline stages
///
/// `class` and `summary` stay `None` until classification and summarization
/// run; they are omitted from serialized records until then, so the crawl
/// artifact carries exactly the url and text of each page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL of the page
    pub url: String,

    /// Extracted text content of the page
    pub text_content: String,

    /// Content category assigned by the classifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ContentCategory>,

    /// Page summary produced by the summarizer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl PageRecord {
    /// Create a record fresh out of the crawl, before classification
    pub fn new(url: impl Into<String>, text_content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text_content: text_content.into(),
            class: None,
            summary: None,
        }
    }
}

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Domains the crawl is allowed to stay within
    pub allowed_domains: Vec<String>,

    /// Languages (ISO 639-1 codes) accepted by the language gate
    pub languages: Vec<String>,

    /// Maximum number of pages to retain per run
    pub max_pages: usize,

    /// CSS selector for the main content container
    pub content_selector: String,

    /// User agent to use for requests
    pub user_agent: String,

    /// Per-request fetch timeout in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            languages: vec!["en".to_string()],
            max_pages: DEFAULT_MAX_PAGES,
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            user_agent: format!("rivalscan-crawler/{}", env!("CARGO_PKG_VERSION")),
            fetch_timeout_secs: 30,
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

    /// Set the domains the crawl may stay within
    pub fn allowed_domains(mut self, allowed_domains: Vec<String>) -> Self {
        self.config.allowed_domains = allowed_domains;
        self
    }

    /// Set the accepted languages
    pub fn languages(mut self, languages: Vec<String>) -> Self {
        self.config.languages = languages;
        self
    }

    /// Set the maximum number of pages to retain per run
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the CSS selector for the main content container
    pub fn content_selector(mut self, content_selector: impl Into<String>) -> Self {
        self.config.content_selector = content_selector.into();
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the per-request fetch timeout in seconds
    pub fn fetch_timeout_secs(mut self, fetch_timeout_secs: u64) -> Self {
        self.config.fetch_timeout_secs = fetch_timeout_secs;
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_record_serializes_without_empty_stages() {
        let record = PageRecord::new("https://example.com", "some text");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["url"], "https://example.com");
        assert_eq!(json["text_content"], "some text");
        assert!(json.get("class").is_none());
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = CrawlerConfig::builder()
            .allowed_domains(vec!["example.com".to_string()])
            .languages(vec!["en".to_string(), "de".to_string()])
            .max_pages(25)
            .content_selector("main")
            .build();

        assert_eq!(config.allowed_domains, vec!["example.com"]);
        assert_eq!(config.languages.len(), 2);
        assert_eq!(config.max_pages, 25);
        assert_eq!(config.content_selector, "main");
    }
}
