//! Similarity collaborators: instant-answer matching and Q&A enrichment

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarAnswerRequest {
    pub chat_id: String,
    pub questions: Vec<String>,
    pub agent_type: String,
    pub page_language: Option<String>,
    pub detected_language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceCitation {
    pub citation_head: Option<String>,
    pub provided_citation_url: Option<String>,
    pub ai_citation_url: Option<String>,
}

/// A previously-answered question judged similar enough to reuse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarAnswerMatch {
    pub answer: String,
    pub english_answer: Option<String>,
    pub similarity: Option<f64>,
    pub citation: Option<SourceCitation>,

    /// Identifiers of the matched chat/interaction, when available.
    pub chat_id: Option<String>,
    pub interaction_id: Option<String>,
}

/// Vector-similarity lookup over previously answered questions.
#[async_trait]
pub trait SimilarityMatcher: Send + Sync + Debug {
    async fn find_similar_answer(
        &self,
        request: SimilarAnswerRequest,
    ) -> Result<Option<SimilarAnswerMatch>, DomainError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarQuestionsOptions {
    pub provider: Option<String>,
    pub language: Option<String>,
}

/// Builds a prompt-injection block of semantically similar prior Q&A pairs
/// with expert feedback. Best-effort enrichment only.
#[async_trait]
pub trait SimilarQuestionsProvider: Send + Sync + Debug {
    async fn similar_questions_context(
        &self,
        question: &str,
        options: SimilarQuestionsOptions,
    ) -> Result<String, DomainError>;
}
