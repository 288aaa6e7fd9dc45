//! Domain layer - workflow state, sanitization, answer parsing and
//! collaborator contracts

pub mod answer;
pub mod conversation;
pub mod context;
pub mod error;
pub mod redaction;
pub mod traits;
pub mod workflow;

pub use answer::{parse_response, parse_sentences, Answer, AnswerRecord, AnswerType};
pub use conversation::{ConversationTurn, InteractionSnapshot, Sender};
pub use context::{ContextData, TranslationData};
pub use error::DomainError;
pub use redaction::{
    RedactedItem, Redaction, RedactionKind, Sanitizer, SanitizerError, WordCategory,
    WordListSource,
};
pub use workflow::{
    NodeKind, RedactionError, ShortCircuitPayload, ShortQueryValidation, StateUpdate,
    WorkflowError, WorkflowResult, WorkflowState, WorkflowStatus, WorkflowVariant,
};
