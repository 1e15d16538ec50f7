//! Run configuration
//!
//! The binary reads a JSON file describing the application settings, the
//! reference product, and the competitor list. Credentials stay out of the
//! file; the completion-service endpoint and API key come from the
//! environment (see `main.rs`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::crawler::DEFAULT_MAX_PAGES;
use crate::error::{Error, Result};

/// Top-level run configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Application-wide settings
    pub application: ApplicationConfig,

    /// The reference product competitors are compared against
    pub product: ProductConfig,

    /// Competitors to analyze, in order
    pub competitors: Vec<CompetitorConfig>,
}

/// Application-wide settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Completion-service model name
    pub model: String,

    /// Languages (ISO 639-1 codes) retained by the crawl
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Directory run outputs are created under
    #[serde(default = "default_root_folder")]
    pub root_folder: PathBuf,

    /// Page budget per competitor crawl
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// External word-cloud renderer program; omit to skip the image
    #[serde(default)]
    pub wordcloud_command: Option<String>,
}

/// The reference product description
#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    /// Product name, used in the comparative report sections
    pub name: String,

    /// Product description and feature list
    pub description: String,
}

/// One competitor to crawl and analyze
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorConfig {
    /// Competitor name; also names the output directory and artifacts
    pub name: String,

    /// Domains the crawl may stay within
    pub allowed_domains: Vec<String>,

    /// Seed URLs the crawl starts from
    pub start_urls: Vec<String>,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_root_folder() -> PathBuf {
    PathBuf::from("runs")
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.competitors.is_empty() {
            return Err(Error::InvalidConfig(
                "no competitors configured".to_string(),
            ));
        }
        for competitor in &self.competitors {
            if competitor.start_urls.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "competitor '{}' has no start URLs",
                    competitor.name
                )));
            }
            if competitor.allowed_domains.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "competitor '{}' has no allowed domains",
                    competitor.name
                )));
            }
        }
        Ok(())
    }
}
