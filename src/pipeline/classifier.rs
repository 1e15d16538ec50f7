//! Content classification stage
//!
//! Labels each retained page with a content-type category via one
//! completion-service request per page. Categories irrelevant to competitive
//! analysis are dropped by the orchestrator using an exclusion set supplied
//! alongside the classifier, not baked into the category enum.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::completion::{CompletionModel, CompletionRequest};
use crate::error::{Error, Result};
use crate::pipeline::END_OF_TEXT_MARKER;

const SYS_PROMPT: &str = "As a Content Classifier, your task is to classify the given text into one of \
the predefined content types. The available content types are:\n\n\
{content_types}.\n\n\
Read the text carefully and determine the most appropriate content type \
based on the information provided. Output ONLY the classification result in \
JSON format with the key \"content_type\" and the corresponding normalized \
value. Do not include any explanations or additional text.";

/// Closed set of page-purpose labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    ProductDescription,
    ServiceDescription,
    BlogPost,
    AboutUs,
    ContactInformation,
    Testimonial,
    Faq,
    PricingInformation,
    TeamIntroduction,
    Others,
}

impl ContentCategory {
    /// All categories, in declaration order
    pub const ALL: [ContentCategory; 10] = [
        ContentCategory::ProductDescription,
        ContentCategory::ServiceDescription,
        ContentCategory::BlogPost,
        ContentCategory::AboutUs,
        ContentCategory::ContactInformation,
        ContentCategory::Testimonial,
        ContentCategory::Faq,
        ContentCategory::PricingInformation,
        ContentCategory::TeamIntroduction,
        ContentCategory::Others,
    ];

    /// The serialized snake_case name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::ProductDescription => "product_description",
            ContentCategory::ServiceDescription => "service_description",
            ContentCategory::BlogPost => "blog_post",
            ContentCategory::AboutUs => "about_us",
            ContentCategory::ContactInformation => "contact_information",
            ContentCategory::Testimonial => "testimonial",
            ContentCategory::Faq => "faq",
            ContentCategory::PricingInformation => "pricing_information",
            ContentCategory::TeamIntroduction => "team_introduction",
            ContentCategory::Others => "others",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories dropped from competitive analysis by default
pub fn default_excluded_categories() -> HashSet<ContentCategory> {
    HashSet::from([
        ContentCategory::BlogPost,
        ContentCategory::ContactInformation,
        ContentCategory::Testimonial,
        ContentCategory::Faq,
        ContentCategory::PricingInformation,
        ContentCategory::TeamIntroduction,
    ])
}

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    content_type: ContentCategory,
}

/// Classifies page text into a [`ContentCategory`]
pub struct ContentClassifier {
    model: Arc<dyn CompletionModel>,
    excluded: HashSet<ContentCategory>,
    sys_prompt: String,
}

impl ContentClassifier {
    /// Create a classifier offering every category not in `excluded`
    pub fn new(model: Arc<dyn CompletionModel>, excluded: HashSet<ContentCategory>) -> Self {
        let offered: Vec<&str> = ContentCategory::ALL
            .iter()
            .filter(|category| !excluded.contains(category))
            .map(ContentCategory::as_str)
            .collect();
        let sys_prompt = SYS_PROMPT.replace("{content_types}", &offered.join(", "));

        Self {
            model,
            excluded,
            sys_prompt,
        }
    }

    /// Classify one page's text
    ///
    /// The response contract is strict: after trimming and stripping the
    /// end-of-generation marker, the text must be exactly a JSON object
    /// `{"content_type": <category>}`. Malformed JSON or a value outside the
    /// enumeration is an error for that page, never a silent default.
    #[instrument(skip(self, content), level = "debug")]
    pub async fn classify(&self, content: &str) -> Result<ContentCategory> {
        let raw = self
            .model
            .complete(CompletionRequest {
                system: self.sys_prompt.clone(),
                user: content.to_string(),
                max_tokens: 64,
                temperature: 0.0,
            })
            .await?;

        let cleaned = raw.trim().replace(END_OF_TEXT_MARKER, "");
        let parsed: ClassificationResponse = serde_json::from_str(&cleaned).map_err(|e| {
            Error::UnexpectedResponse(format!(
                "classification response is not a valid content type object: {} (raw: {})",
                e,
                cleaned.chars().take(120).collect::<String>()
            ))
        })?;

        debug!(category = %parsed.content_type, "page classified");
        Ok(parsed.content_type)
    }

    /// Check whether a category is excluded from analysis
    pub fn is_excluded(&self, category: ContentCategory) -> bool {
        self.excluded.contains(&category)
    }
}
