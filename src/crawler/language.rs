//! Language gate for crawled content

use crate::crawler::error::CrawlError;
use tracing::debug;
use whatlang::Lang;

/// Accepts or rejects page text based on its detected dominant language
///
/// Detection failure (text too short or too ambiguous to call) rejects the
/// page; the crawl itself is unaffected and continues through the page's
/// links.
#[derive(Debug, Clone)]
pub struct LanguageGate {
    allowed: Vec<Lang>,
}

impl LanguageGate {
    /// Build a gate from configured language codes
    ///
    /// Accepts the two-letter codes the configuration uses (en, de, fr, es,
    /// it) as well as raw ISO 639-3 codes. Unknown codes are a configuration
    /// error.
    pub fn new(codes: &[String]) -> Result<Self, CrawlError> {
        let mut allowed = Vec::with_capacity(codes.len());
        for code in codes {
            let lang = match code.as_str() {
                "en" => Lang::Eng,
                "de" => Lang::Deu,
                "fr" => Lang::Fra,
                "es" => Lang::Spa,
                "it" => Lang::Ita,
                other => Lang::from_code(other)
                    .ok_or_else(|| CrawlError::UnknownLanguage(other.to_string()))?,
            };
            allowed.push(lang);
        }
        Ok(Self { allowed })
    }

    /// Check whether the text's dominant language is in the allowed set
    pub fn accepts(&self, text: &str) -> bool {
        match whatlang::detect(text) {
            Some(info) => self.allowed.contains(&info.lang()),
            None => {
                debug!("language detection failed, rejecting page");
                false
            }
        }
    }
}
