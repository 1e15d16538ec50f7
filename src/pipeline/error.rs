//! Error types for the analysis pipeline

use crate::error::Error as CrateError;
use crate::pipeline::Stage;
use thiserror::Error;

/// Error type for pipeline operations
///
/// Completion-service failures are tagged with the stage they occurred in
/// and the item (page URL or aggregate) being processed, so a failed run can
/// be retried with full context.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage-level failure on a specific item
    #[error("{stage} failed for {item}: {source}")]
    Stage {
        /// Pipeline stage the failure occurred in
        stage: Stage,
        /// The page URL or aggregate being processed
        item: String,
        /// Underlying error
        source: CrateError,
    },

    /// Word-cloud renderer failure
    #[error("wordcloud renderer failed: {0}")]
    Render(String),

    /// Artifact I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Tag a crate-level error with its stage and offending item
    pub fn stage(stage: Stage, item: impl Into<String>, source: CrateError) -> Self {
        Self::Stage {
            stage,
            item: item.into(),
            source,
        }
    }
}

impl From<PipelineError> for CrateError {
    fn from(err: PipelineError) -> Self {
        CrateError::Pipeline(err.to_string())
    }
}
