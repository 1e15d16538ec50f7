//! # rivalscan - Automated Competitive Intelligence
//!
//! This crate crawls a competitor's website, filters and classifies the
//! retained pages, summarizes them, and produces a structured comparative
//! report against a reference product description.
//!
//! ## Features
//!
//! - Breadth-first, domain-restricted crawling with a per-run page budget
//! - Content extraction with a configurable main-content selector
//! - Language filtering of crawled pages
//! - Page classification into a closed set of content categories, with an
//!   exclusion set for categories irrelevant to competitive analysis
//! - Per-page and company-level summaries through an injectable
//!   completion-service client
//! - A four-section comparative report against the reference product
//! - Async API with Tokio, structured logging with tracing
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rivalscan::completion::Client;
//! use rivalscan::pipeline::{CompetitorAnalyzer, NullRenderer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("https://api.example.com/v1", "api-key", "llama-3-70b");
//!     let analyzer = CompetitorAnalyzer::new(
//!         Arc::new(client),
//!         Arc::new(NullRenderer),
//!         "Acme Planner",
//!         "A planning tool for software teams.",
//!     );
//!
//!     let artifacts = analyzer
//!         .analyze(
//!             std::path::Path::new("runs/rivalco"),
//!             "rivalco",
//!             &["rivalco.com".to_string()],
//!             &["https://rivalco.com".to_string()],
//!             &["en".to_string()],
//!             10,
//!         )
//!         .await?;
//!
//!     println!("report: {}", artifacts.report.display());
//!     Ok(())
//! }
//! ```

mod error;

pub mod completion;
pub mod config;
pub mod crawler;
pub mod pipeline;

pub use error::{Error, Result};

/// Re-export of the most commonly used types
pub mod prelude {
    pub use crate::completion::{Client, CompletionModel};
    pub use crate::crawler::{Crawler, CrawlerConfig, PageRecord};
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{AnalysisArtifacts, CompetitorAnalyzer, ContentCategory};
}
