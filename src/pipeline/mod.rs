//! Competitor analysis pipeline
//!
//! This module orchestrates one competitor run end to end: crawl the
//! competitor's site, render the word-cloud input, classify and filter the
//! retained pages, summarize them, and produce the comparative report. The
//! stages run strictly forward (`Idle -> Crawling -> Classifying ->
//! Summarizing -> Comparing -> Done`, with `Failed` terminal from any
//! stage); each stage's artifact is persisted before the next stage starts,
//! and partial artifacts stay on disk when a run fails.

mod analyzer;
mod classifier;
mod error;
mod summarizer;
mod wordcloud;

pub use analyzer::ComparativeAnalyzer;
pub use classifier::{default_excluded_categories, ContentCategory, ContentClassifier};
pub use error::PipelineError;
pub use summarizer::{extract_json_object, Summarizer, DEFAULT_MAX_WORDS};
pub use wordcloud::{normalize_text, CommandRenderer, NullRenderer, WordcloudRenderer};

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::completion::CompletionModel;
use crate::crawler::{Crawler, CrawlerConfig, PageRecord};

/// Marker some inference servers leave at the end of generated text
pub(crate) const END_OF_TEXT_MARKER: &str = "<|eot_id|>";

/// Characters skipped at the start of page text before classification and
/// summarization; most pages front-load meta noise there.
const TEXT_OFFSET: usize = 150;

/// Character budget for the aggregate passed to the company-level summary
/// and the comparative analysis (7 chars/word x 4000 words).
const MAX_AGGREGATE_CHARS: usize = 28_000;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Crawling,
    Classifying,
    Summarizing,
    Comparing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Crawling => "crawling",
            Stage::Classifying => "classifying",
            Stage::Summarizing => "summarizing",
            Stage::Comparing => "comparing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Paths of the four artifacts produced by one competitor run
#[derive(Debug, Clone)]
pub struct AnalysisArtifacts {
    /// Comparative report text
    pub report: PathBuf,

    /// Word-cloud image
    pub wordcloud: PathBuf,

    /// Per-page and company summaries
    pub summaries: PathBuf,

    /// Raw crawl output
    pub crawl: PathBuf,
}

/// Orchestrates the full analysis of one competitor
///
/// Owns the completion-service client and the word-cloud renderer for the
/// duration of a run and hands them to the stages that need them.
pub struct CompetitorAnalyzer {
    renderer: Arc<dyn WordcloudRenderer>,
    classifier: ContentClassifier,
    summarizer: Summarizer,
    comparer: ComparativeAnalyzer,
}

impl CompetitorAnalyzer {
    /// Create an analyzer with the default category exclusions
    pub fn new(
        model: Arc<dyn CompletionModel>,
        renderer: Arc<dyn WordcloudRenderer>,
        product_name: &str,
        product_description: &str,
    ) -> Self {
        Self::with_excluded_categories(
            model,
            renderer,
            product_name,
            product_description,
            default_excluded_categories(),
        )
    }

    /// Create an analyzer with a custom exclusion set
    pub fn with_excluded_categories(
        model: Arc<dyn CompletionModel>,
        renderer: Arc<dyn WordcloudRenderer>,
        product_name: &str,
        product_description: &str,
        excluded: HashSet<ContentCategory>,
    ) -> Self {
        let classifier = ContentClassifier::new(model.clone(), excluded);
        let summarizer = Summarizer::new(model.clone());
        let comparer = ComparativeAnalyzer::new(model, product_name, product_description);

        Self {
            renderer,
            classifier,
            summarizer,
            comparer,
        }
    }

    /// Run the full pipeline for one competitor
    ///
    /// Writes the four artifacts under `base_folder` and returns their
    /// paths. On an unrecovered error the run stops in place; artifacts
    /// written by earlier stages remain on disk for inspection.
    #[instrument(skip(self, allowed_domains, start_urls, languages), fields(competitor = name))]
    pub async fn analyze(
        &self,
        base_folder: &Path,
        name: &str,
        allowed_domains: &[String],
        start_urls: &[String],
        languages: &[String],
        max_pages: usize,
    ) -> Result<AnalysisArtifacts, PipelineError> {
        info!("running competitor analysis for '{}'", name);

        let artifacts = AnalysisArtifacts {
            report: base_folder.join(format!("res_competitor_analysis_{}.txt", name)),
            wordcloud: base_folder.join(format!("wordcloud_{}.png", name)),
            summaries: base_folder.join(format!("summaries_{}.json", name)),
            crawl: base_folder.join(format!("content_{}.json", name)),
        };

        let mut stage = Stage::Idle;
        match self.run_stages(&mut stage, &artifacts, name, allowed_domains, start_urls, languages, max_pages).await {
            Ok(()) => {
                stage = Stage::Done;
                info!(stage = %stage, "competitor analysis completed");
                Ok(artifacts)
            }
            Err(e) => {
                error!(stage = %stage, error = %e, "competitor analysis failed");
                stage = Stage::Failed;
                debug!(stage = %stage, "pipeline stopped");
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_stages(
        &self,
        stage: &mut Stage,
        artifacts: &AnalysisArtifacts,
        name: &str,
        allowed_domains: &[String],
        start_urls: &[String],
        languages: &[String],
        max_pages: usize,
    ) -> Result<(), PipelineError> {
        // Crawl the competitor site.
        *stage = Stage::Crawling;
        debug!(stage = %stage, "entering stage");

        let config = CrawlerConfig::builder()
            .allowed_domains(allowed_domains.to_vec())
            .languages(languages.to_vec())
            .max_pages(max_pages)
            .build();
        let crawler = Crawler::new(config)
            .map_err(|e| PipelineError::stage(Stage::Crawling, "crawler configuration", e.into()))?;
        let pages = crawler.crawl(start_urls).await;

        let crawl_json = serde_json::to_string_pretty(&pages)?;
        tokio::fs::write(&artifacts.crawl, crawl_json).await?;
        info!(pages = pages.len(), path = %artifacts.crawl.display(), "crawl artifact written");

        // Word-cloud input: the concatenated raw contents, normalized, with
        // the competitor name removed.
        let concatenated = pages
            .iter()
            .map(|page| page.text_content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let cloud_text = normalize_text(&concatenated).replace(name, "");
        self.renderer.render(&cloud_text, &artifacts.wordcloud).await?;

        // Classify pages and drop excluded categories.
        *stage = Stage::Classifying;
        debug!(stage = %stage, "entering stage");

        let mut retained: Vec<PageRecord> = Vec::new();
        for mut page in pages {
            let shaped = format!("url: {} \n\n {}", page.url, skip_chars(&page.text_content, TEXT_OFFSET));
            let category = self
                .classifier
                .classify(&shaped)
                .await
                .map_err(|e| PipelineError::stage(Stage::Classifying, &page.url, e))?;

            if self.classifier.is_excluded(category) {
                debug!(url = %page.url, category = %category, "page excluded from analysis");
                continue;
            }
            page.class = Some(category);
            retained.push(page);
        }
        info!(pages = retained.len(), "classification finished");

        // Summarize each retained page, then the company as a whole.
        *stage = Stage::Summarizing;
        debug!(stage = %stage, "entering stage");

        for page in &mut retained {
            let summary = self
                .summarizer
                .summarize(skip_chars(&page.text_content, TEXT_OFFSET))
                .await
                .map_err(|e| PipelineError::stage(Stage::Summarizing, &page.url, e))?;
            page.summary = Some(summary);
        }

        let aggregate: String = retained
            .iter()
            .filter_map(|page| page.summary.as_deref())
            .collect::<Vec<_>>()
            .join(". ");
        let aggregate = truncate_chars(&aggregate, MAX_AGGREGATE_CHARS).to_string();

        // Nothing retained means nothing to summarize; an empty total
        // summary is written instead of asking the service to invent one.
        let total_summary = if aggregate.is_empty() {
            String::new()
        } else {
            self.summarizer
                .summarize(&aggregate)
                .await
                .map_err(|e| PipelineError::stage(Stage::Summarizing, "company aggregate", e))?
        };

        let mut summary_records: Vec<serde_json::Value> = Vec::with_capacity(retained.len() + 1);
        for page in &retained {
            summary_records.push(serde_json::to_value(page)?);
        }
        summary_records.push(json!({ "total_summary": total_summary }));

        let summaries_json = serde_json::to_string_pretty(&summary_records)?;
        tokio::fs::write(&artifacts.summaries, summaries_json).await?;
        info!(path = %artifacts.summaries.display(), "summaries artifact written");

        // Compare against the reference product.
        *stage = Stage::Comparing;
        debug!(stage = %stage, "entering stage");

        let report = self
            .comparer
            .compare(&aggregate)
            .await
            .map_err(|e| PipelineError::stage(Stage::Comparing, "company aggregate", e))?;
        tokio::fs::write(&artifacts.report, &report).await?;
        info!(path = %artifacts.report.display(), "report artifact written");

        Ok(())
    }
}

/// Skip the first `n` characters of `text`, respecting char boundaries
fn skip_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

/// Keep at most `max` characters of `text`, respecting char boundaries
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
