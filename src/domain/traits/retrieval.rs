//! Retrieval collaborators: search, context summarization and scenario
//! overrides

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

use crate::domain::context::TranslationData;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub chat_id: String,
    pub search_service: Option<String>,
    pub agent_type: String,
    pub referring_url: Option<String>,
    pub translation_data: Option<TranslationData>,
    pub page_language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// The rewritten query the backend actually searched with.
    pub query: Option<String>,

    #[serde(default)]
    pub results: Value,

    pub system_prompt: Option<String>,
}

/// Query-rewriting search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync + Debug {
    async fn search(&self, request: SearchRequest) -> Result<SearchOutcome, DomainError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextRequest {
    pub chat_id: String,
    pub message: String,
    pub system_prompt: String,
    #[serde(default)]
    pub search_results: Value,
    pub provider: String,
    pub language: String,
}

/// Topic/department resolution produced by the context model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSummary {
    pub topic: Option<String>,
    pub topic_url: Option<String>,
    pub department: Option<String>,
    pub department_url: Option<String>,
    pub model: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

#[async_trait]
pub trait ContextSummarizer: Send + Sync + Debug {
    async fn summarize(&self, request: ContextRequest) -> Result<ContextSummary, DomainError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOverride {
    pub id: Option<String>,
    pub override_text: String,
}

/// Per-department system-prompt overrides maintained by admin users.
#[async_trait]
pub trait ScenarioOverrideLookup: Send + Sync + Debug {
    async fn active_override(
        &self,
        user_id: &str,
        department_key: &str,
    ) -> Result<Option<ScenarioOverride>, DomainError>;
}
