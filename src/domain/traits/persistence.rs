//! Interaction persistence collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::answer::Answer;
use crate::domain::context::ContextData;
use crate::domain::error::DomainError;

/// Caller identity forwarded with the request, used to attribute persisted
/// interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

/// The full interaction record handed to the persistence backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub chat_id: String,
    pub selected_ai: String,
    pub question: String,
    pub user_message_id: Option<String>,
    pub referring_url: Option<String>,
    pub answer: Option<Answer>,
    pub final_citation_url: Option<String>,
    pub context: Option<ContextData>,

    /// Wire name of the workflow variant that produced the interaction.
    pub workflow: String,

    pub page_language: String,
    pub response_time: i64,
    pub search_provider: Option<String>,

    pub instant_answer_chat_id: Option<String>,
    pub instant_answer_interaction_id: Option<String>,
}

#[async_trait]
pub trait PersistenceSink: Send + Sync + Debug {
    async fn persist_interaction(
        &self,
        record: &InteractionRecord,
        user: Option<&UserIdentity>,
    ) -> Result<(), DomainError>;
}
