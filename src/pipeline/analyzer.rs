//! Comparative analysis stage
//!
//! Issues the single final completion request comparing the aggregated
//! competitor summary against the reference product description. The
//! response is persisted verbatim; splitting it into sections is a
//! presentation concern outside this crate.

use std::sync::Arc;

use tracing::instrument;

use crate::completion::{CompletionModel, CompletionRequest};
use crate::error::Result;
use crate::pipeline::END_OF_TEXT_MARKER;

const SYS_PROMPT: &str = "As a Competitive Analyst, your task is to compare the features of our product \
{product_name} with the features of the competitor product following.\n\n\
{product_name} description and features:\n\
{product_description}\n\n\
Provide a comparative analysis of the features, highlighting the \
similarities, differences, and any unique aspects of each product. Focus on \
the key areas where {product_name} differentiates itself from the \
competitor. Identify potential gaps or areas of improvement for \
{product_name} based on the competitor's offerings.\n\n\
Structure your analysis in the following format:\n\
1. Similarities:\n\
  - Point 1\n\
  - Point 2\n\
  ...\n\
2. Differences:\n\
  - Point 1\n\
  - Point 2\n\
  ...\n\
3. Unique aspects of {product_name}:\n\
  - Point 1\n\
  - Point 2\n\
  ...\n\
4. Potential gaps or areas of improvement for {product_name}:\n\
  - Point 1\n\
  - Point 2\n\
  ...\n\n\
Provide your analysis in a concise and clear manner, focusing on the most \
important points. Start directly with the first point without any \
introductory phrases or additional remarks.";

/// Maximum output tokens granted to the comparative report
const MAX_TOKENS: u32 = 8000;

/// Produces the structured comparative report
pub struct ComparativeAnalyzer {
    model: Arc<dyn CompletionModel>,
    sys_prompt: String,
}

impl ComparativeAnalyzer {
    /// Create an analyzer for the given reference product
    pub fn new(
        model: Arc<dyn CompletionModel>,
        product_name: &str,
        product_description: &str,
    ) -> Self {
        let sys_prompt = SYS_PROMPT
            .replace("{product_name}", product_name)
            .replace("{product_description}", product_description);
        Self { model, sys_prompt }
    }

    /// Compare the aggregated competitor summary against the reference product
    #[instrument(skip(self, company_summary), level = "debug")]
    pub async fn compare(&self, company_summary: &str) -> Result<String> {
        let raw = self
            .model
            .complete(CompletionRequest {
                system: self.sys_prompt.clone(),
                user: company_summary.to_string(),
                max_tokens: MAX_TOKENS,
                temperature: 0.0,
            })
            .await?;

        Ok(raw.replace(END_OF_TEXT_MARKER, "").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::mock::MockCompletion;

    #[tokio::test]
    async fn test_compare_returns_report_verbatim() {
        let mock = MockCompletion::new();
        mock.push_response("1. Similarities:\n  - Both offer dashboards\n<|eot_id|>")
            .await;

        let analyzer = ComparativeAnalyzer::new(
            Arc::new(mock.clone()),
            "Acme Planner",
            "A planning tool for teams.",
        );
        let report = analyzer.compare("competitor summary").await.unwrap();

        assert_eq!(report, "1. Similarities:\n  - Both offer dashboards");
    }

    #[tokio::test]
    async fn test_prompt_names_product_and_sections() {
        let mock = MockCompletion::new();
        mock.push_response("report").await;

        let analyzer = ComparativeAnalyzer::new(
            Arc::new(mock.clone()),
            "Acme Planner",
            "A planning tool for teams.",
        );
        analyzer.compare("competitor summary").await.unwrap();

        let requests = mock.requests().await;
        let prompt = &requests[0].system;
        assert!(prompt.contains("Acme Planner description and features"));
        assert!(prompt.contains("A planning tool for teams."));
        assert!(prompt.contains("1. Similarities:"));
        assert!(prompt.contains("2. Differences:"));
        assert!(prompt.contains("3. Unique aspects of Acme Planner:"));
        assert!(prompt.contains("4. Potential gaps or areas of improvement for Acme Planner:"));
        assert!(!prompt.contains("{product_name}"));
        assert_eq!(requests[0].max_tokens, 8000);
    }
}
