//! Answer Pipeline
//!
//! Request-scoped question-answering workflow core:
//! - Moderation and short-query validation
//! - Pattern-based redaction of profanity, threats, manipulation and PII
//! - Translation into the canonical working language (English)
//! - Retrieval-augmented context derivation with scenario overrides
//! - Similar-answer short-circuiting for first-turn questions
//! - Tagged answer parsing, citation verification and interaction persistence
//!
//! The concrete search, generation, translation and persistence backends are
//! collaborators injected behind the traits in [`domain::traits`].

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

pub use domain::answer::{parse_response, parse_sentences, Answer, AnswerRecord, AnswerType};
pub use domain::redaction::{RedactedItem, RedactionKind, Sanitizer, SanitizerError};
pub use domain::workflow::{
    NodeKind, RedactionError, ShortCircuitPayload, ShortQueryValidation, StateUpdate,
    WorkflowError, WorkflowResult, WorkflowState, WorkflowStatus, WorkflowVariant,
};
pub use infrastructure::workflow::{
    EventLogger, NodeLibrary, NodeLibraryDeps, RequestContext, UserIdentity, WorkflowEngine,
};

/// Wire a node library onto an engine. Callers hold one engine and run it
/// once per inbound request.
pub fn create_engine(deps: NodeLibraryDeps) -> WorkflowEngine {
    WorkflowEngine::new(NodeLibrary::new(deps))
}
