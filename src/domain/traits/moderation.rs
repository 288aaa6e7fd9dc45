//! Moderation collaborators: short-query validation and PII detection

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::conversation::ConversationTurn;
use crate::domain::error::DomainError;
use crate::domain::workflow::ShortQueryValidation;

/// Judges whether a message is too short or low-information to answer
/// meaningfully given the conversation so far.
#[async_trait]
pub trait ShortQueryValidator: Send + Sync + Debug {
    async fn validate(
        &self,
        history: &[ConversationTurn],
        message: &str,
        lang: &str,
        department: Option<&str>,
    ) -> Result<(), ShortQueryValidation>;
}

/// Model-backed PII detection, independent of the pattern sanitizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiiCheck {
    /// Content-safety trip; the message must be discarded entirely.
    pub blocked: bool,

    /// Redaction string supplied by the detector when PII is present but
    /// not blocking.
    pub pii: Option<String>,
}

#[async_trait]
pub trait PiiDetector: Send + Sync + Debug {
    async fn check(&self, message: &str, agent_type: &str) -> Result<PiiCheck, DomainError>;
}
