//! Context and translation records threaded through the workflow

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of translating the redacted question into the canonical working
/// language (English).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranslationData {
    /// Detected language of the user's question, when the translator reports
    /// one (e.g. "eng", "fra").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,

    #[serde(default)]
    pub translated_language: String,

    #[serde(default)]
    pub translated_text: String,

    /// The redacted text the translator was given. Never the raw message.
    #[serde(default)]
    pub original_text: String,

    /// True when the question was already in the working language.
    #[serde(default)]
    pub no_translation: bool,
}

impl TranslationData {
    /// A passthrough record for text already in the desired language.
    pub fn passthrough(text: impl Into<String>, desired_language: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            original_language: None,
            translated_language: desired_language.into(),
            translated_text: text.clone(),
            original_text: text,
            no_translation: true,
        }
    }
}

/// Everything the answer-generation step needs to know about the question:
/// retrieval output, resolved department/topic, system prompt and the
/// input/output language pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContextData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_url: Option<String>,

    /// Query the search collaborator actually executed. A non-empty value
    /// marks the context as reusable on follow-up turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    #[serde(default)]
    pub system_prompt: String,

    #[serde(default)]
    pub search_results: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_question: Option<String>,

    /// Page language of the request ("en" / "fr").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Language the answer must be produced in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_lang: Option<String>,

    /// Detected language of the user's question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_lang: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_user_message: Option<String>,

    /// Prompt-injection block of semantically similar prior Q&A pairs.
    #[serde(default)]
    pub similar_questions: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
}

impl ContextData {
    /// Whether a follow-up turn can reuse this context without re-running
    /// retrieval and summarization.
    pub fn has_search_query(&self) -> bool {
        self.search_query.as_deref().is_some_and(|q| !q.is_empty())
    }
}

/// Resolve the output language for answer generation: French pages always
/// answer in French; otherwise the detected question language wins, with
/// English as the default.
pub fn determine_output_lang(page_lang: &str, translation: Option<&TranslationData>) -> String {
    if page_lang == "fr" {
        return "fra".to_string();
    }
    translation
        .and_then(|t| t.original_language.clone())
        .unwrap_or_else(|| "eng".to_string())
}
