//! Summarization stage
//!
//! Reduces page text to a bounded-length summary through one
//! completion-service request per call. Used twice by the orchestrator: once
//! per retained page, and once over the concatenation of all page summaries
//! to produce the company-level summary.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{instrument, trace};

use crate::completion::{CompletionModel, CompletionRequest};
use crate::error::{Error, Result};
use crate::pipeline::END_OF_TEXT_MARKER;

const SYS_PROMPT: &str = "As a Competitor Analyst, your task is to analyze the homepage content of our \
competitor. The text below is the contents extracted from their homepage. \
Summarize the content without adding any comments or remarks and produce \
following JSON output:\n\
{\"summary\": <results - range: 150-{num_words} words>}";

/// Default upper bound of the requested summary length, in words
pub const DEFAULT_MAX_WORDS: usize = 400;

/// Maximum output tokens granted to a summary request
const MAX_TOKENS: u32 = 1200;

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

/// Extract the outermost JSON object embedded in completion output
///
/// Contract: returns the substring between the first `{` and the last `}`
/// inclusive, or `None` when no well-formed brace pair exists. Completion
/// output is not guaranteed machine-clean; this tolerates conversational
/// padding around the object without attempting to repair the JSON itself.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Produces bounded-length summaries of page and company text
pub struct Summarizer {
    model: Arc<dyn CompletionModel>,
    sys_prompt: String,
}

impl Summarizer {
    /// Create a summarizer with the default word range (150-400)
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self::with_max_words(model, DEFAULT_MAX_WORDS)
    }

    /// Create a summarizer with a custom upper word bound
    pub fn with_max_words(model: Arc<dyn CompletionModel>, max_words: usize) -> Self {
        let sys_prompt = SYS_PROMPT.replace("{num_words}", &max_words.to_string());
        Self { model, sys_prompt }
    }

    /// Summarize one text into a bounded-length summary
    ///
    /// Response handling: the raw completion is lower-cased, the
    /// end-of-generation marker stripped and embedded newlines removed, then
    /// the outermost JSON object is extracted and parsed for its `summary`
    /// value. Anything without a well-formed brace pair is an error.
    #[instrument(skip(self, content), fields(chars = content.len()), level = "debug")]
    pub async fn summarize(&self, content: &str) -> Result<String> {
        let raw = self
            .model
            .complete(CompletionRequest {
                system: self.sys_prompt.clone(),
                user: content.to_string(),
                max_tokens: MAX_TOKENS,
                temperature: 0.0,
            })
            .await?;

        let cleaned = raw
            .trim()
            .replace(END_OF_TEXT_MARKER, "")
            .to_lowercase()
            .replace('\n', "");

        let object = extract_json_object(&cleaned).ok_or_else(|| {
            Error::UnexpectedResponse(format!(
                "summary response contains no JSON object (raw: {})",
                cleaned.chars().take(120).collect::<String>()
            ))
        })?;

        let parsed: SummaryResponse = serde_json::from_str(object).map_err(|e| {
            Error::UnexpectedResponse(format!("summary object failed to parse: {}", e))
        })?;

        trace!(chars = parsed.summary.len(), "summary produced");
        Ok(parsed.summary)
    }
}
