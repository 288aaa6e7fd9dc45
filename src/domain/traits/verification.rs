//! Citation URL validation collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlCheck {
    pub is_valid: bool,

    /// Possibly-normalized form of the checked URL.
    pub url: Option<String>,
}

#[async_trait]
pub trait UrlValidator: Send + Sync + Debug {
    /// Live-check a citation URL (catches hallucinated links).
    async fn validate_url(&self, url: &str, chat_id: &str) -> Result<UrlCheck, DomainError>;

    /// Build a search-page fallback URL for when the citation failed its
    /// live check.
    async fn search_fallback(
        &self,
        lang: &str,
        question: &str,
        department: Option<&str>,
        translation_f: Option<&str>,
        chat_id: &str,
    ) -> Result<Option<String>, DomainError>;
}
