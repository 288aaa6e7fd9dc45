//! Translation collaborator

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::context::TranslationData;
use crate::domain::error::DomainError;

/// Result of a translation request. `Blocked` means the upstream
/// content-safety filter tripped; the pipeline discards the text.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    Translated(TranslationData),
    Blocked,
}

#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate `text` into `desired_language`. `translation_context`
    /// carries prior user questions to help language detection.
    async fn translate(
        &self,
        text: &str,
        desired_language: &str,
        agent_type: &str,
        translation_context: &[String],
    ) -> Result<TranslationOutcome, DomainError>;
}
