//! Workflow error taxonomy
//!
//! Validation and redaction failures abort the run before any retrieval or
//! generation cost is incurred. Collaborator failures propagate opaquely.
//! `RedactionError` never carries the raw message; callers must not log or
//! echo the original text once redaction has failed.

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::redaction::{RedactedItem, SanitizerError};

/// The question was judged too short or low-information to answer
/// meaningfully. User-correctable; the caller surfaces it as a
/// clarification request.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ShortQueryValidation {
    pub message: String,
}

impl ShortQueryValidation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Blocked content was detected during moderation. Carries only the masked
/// text and the audit items, never the original message.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct RedactionError {
    pub message: String,
    pub redacted_text: String,
    pub redacted_items: Vec<RedactedItem>,
}

impl RedactionError {
    pub fn new(
        message: impl Into<String>,
        redacted_text: impl Into<String>,
        redacted_items: Vec<RedactedItem>,
    ) -> Self {
        Self {
            message: message.into(),
            redacted_text: redacted_text.into(),
            redacted_items,
        }
    }
}

/// Errors raised by a workflow run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Short query rejected: {0}")]
    ShortQuery(#[from] ShortQueryValidation),

    #[error("Redaction failed: {0}")]
    Redaction(#[from] RedactionError),

    #[error("Sanitizer error: {0}")]
    Sanitizer(#[from] SanitizerError),

    #[error("Node '{node}' failed: {source}")]
    Node {
        node: &'static str,
        source: DomainError,
    },
}

impl WorkflowError {
    pub fn node(node: &'static str, source: DomainError) -> Self {
        Self::Node { node, source }
    }
}
