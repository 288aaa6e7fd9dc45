//! Answer-generation collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

use crate::domain::answer::ToolInvocation;
use crate::domain::conversation::ConversationTurn;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub chat_id: String,
    pub provider: String,

    /// Fully composed outbound prompt, including the output-language token
    /// and optional referring-url tag.
    pub message: String,

    pub conversation_history: Vec<ConversationTurn>,

    /// Desired output language for the generated answer.
    pub lang: String,

    pub department: Option<String>,
    pub topic: Option<String>,
    pub topic_url: Option<String>,
    pub department_url: Option<String>,

    #[serde(default)]
    pub search_results: Value,

    pub system_prompt: String,
    pub similar_questions: String,
    pub referring_url: Option<String>,
    pub original_message: Option<String>,
}

/// Raw model output plus usage metadata. Retry policy lives inside the
/// collaborator, not in this core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedText {
    pub content: String,
    pub model: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,

    #[serde(default)]
    pub tools: Vec<ToolInvocation>,

    pub history_signature: Option<String>,
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync + Debug {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedText, DomainError>;
}
