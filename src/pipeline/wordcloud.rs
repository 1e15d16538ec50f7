//! Word-cloud input preparation and rendering collaborator
//!
//! The pipeline only prepares the text: URLs and punctuation are stripped and
//! the competitor name removed. Turning that text into an image is the job of
//! an external renderer behind the [`WordcloudRenderer`] trait.

use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::pipeline::error::PipelineError;

static NOISE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://|www\.|[^\w.\s])").expect("noise pattern is valid")
});

/// Strip URL prefixes and punctuation from word-cloud input text
pub fn normalize_text(text: &str) -> String {
    NOISE_PATTERN.replace_all(text, "").into_owned()
}

/// External renderer turning normalized text into a word-cloud image
#[async_trait]
pub trait WordcloudRenderer: Send + Sync {
    /// Render `text` into an image at `out_path`
    async fn render(&self, text: &str, out_path: &Path) -> Result<(), PipelineError>;
}

/// Renderer that pipes the text to an external program
///
/// The program is invoked with the output path as its single argument and
/// receives the normalized text on stdin.
pub struct CommandRenderer {
    program: String,
}

impl CommandRenderer {
    /// Create a renderer invoking `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl WordcloudRenderer for CommandRenderer {
    async fn render(&self, text: &str, out_path: &Path) -> Result<(), PipelineError> {
        debug!(program = %self.program, path = %out_path.display(), "rendering word cloud");

        let mut child = Command::new(&self.program)
            .arg(out_path)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PipelineError::Render(format!("failed to spawn '{}': {}", self.program, e))
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            PipelineError::Render(format!("no stdin pipe for '{}'", self.program))
        })?;
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| PipelineError::Render(format!("failed to write text: {}", e)))?;
        drop(stdin);

        let status = child
            .wait()
            .await
            .map_err(|e| PipelineError::Render(format!("renderer did not finish: {}", e)))?;

        if !status.success() {
            return Err(PipelineError::Render(format!(
                "'{}' exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

/// Renderer used when no external program is configured; logs and skips
pub struct NullRenderer;

#[async_trait]
impl WordcloudRenderer for NullRenderer {
    async fn render(&self, _text: &str, out_path: &Path) -> Result<(), PipelineError> {
        warn!(
            path = %out_path.display(),
            "no word-cloud renderer configured, skipping image"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_urls_and_punctuation() {
        let text = "Visit https://example.com/pricing or www.example.com! Plans, trials & more.";
        let normalized = normalize_text(text);

        assert!(!normalized.contains("https"));
        assert!(!normalized.contains("www."));
        assert!(!normalized.contains('!'));
        assert!(!normalized.contains(','));
        assert!(!normalized.contains('&'));
        assert!(normalized.contains("Plans"));
        assert!(normalized.contains("trials"));
    }

    #[test]
    fn test_normalize_keeps_words_dots_and_whitespace() {
        let normalized = normalize_text("release 2.0 is out now");
        assert_eq!(normalized, "release 2.0 is out now");
    }

    #[tokio::test]
    async fn test_null_renderer_is_a_noop() {
        let renderer = NullRenderer;
        let result = renderer.render("words", Path::new("/nonexistent/x.png")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_command_renderer_missing_program_is_error() {
        let renderer = CommandRenderer::new("definitely-not-a-real-renderer-binary");
        let result = renderer.render("words", Path::new("/tmp/x.png")).await;
        assert!(matches!(result, Err(PipelineError::Render(_))));
    }
}
