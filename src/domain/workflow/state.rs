//! Per-request workflow state
//!
//! One `WorkflowState` instance exists per engine run. Identity fields are
//! set by the caller and never change; derived fields are each written by
//! exactly one node via a [`StateUpdate`] merge.

use serde::{Deserialize, Serialize};

use crate::domain::answer::Answer;
use crate::domain::context::{ContextData, TranslationData};
use crate::domain::conversation::ConversationTurn;
use crate::domain::workflow::WorkflowVariant;

/// Caller-visible progress marker, serialized with the wire names clients
/// poll for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowStatus {
    ModeratingQuestion,
    BuildingContext,
    GeneratingAnswer,
    VerifyingCitation,
    NeedClarification,
    Complete,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModeratingQuestion => "moderatingQuestion",
            Self::BuildingContext => "buildingContext",
            Self::GeneratingAnswer => "generatingAnswer",
            Self::VerifyingCitation => "verifyingCitation",
            Self::NeedClarification => "needClarification",
            Self::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NeedClarification | Self::Complete)
    }
}

/// Answer bundle synthesized when a sufficiently similar prior answer is
/// found on the first turn of a conversation. Once present, later nodes
/// treat it as the authoritative answer and generation is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortCircuitPayload {
    pub answer: Answer,
    pub context: ContextData,
    pub final_citation_url: Option<String>,
    pub chat_id: String,
    pub page_language: String,
    pub response_time: i64,
    pub instant_answer_chat_id: Option<String>,
    pub instant_answer_interaction_id: Option<String>,
}

/// What the caller gets back after a successful run. Built in the verify
/// node so it exists on the short-circuit branch too.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub answer: Answer,
    pub context: ContextData,
    pub question: String,
    pub citation_url: Option<String>,
    pub history_signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    // Identity fields, fixed at construction.
    pub chat_id: String,
    pub user_message: String,
    pub user_message_id: String,
    pub conversation_history: Vec<ConversationTurn>,
    pub lang: String,
    pub department: Option<String>,
    pub referring_url: Option<String>,
    pub selected_ai: String,
    pub search_provider: Option<String>,
    pub override_user_id: Option<String>,
    /// Pre-translated French form of the question, used only when building
    /// a search-fallback citation URL.
    pub translation_f: Option<String>,
    pub variant: WorkflowVariant,

    // Derived fields, each owned by one node.
    pub start_time: Option<i64>,
    pub redacted_text: Option<String>,
    pub translation_data: Option<TranslationData>,
    pub cleaned_history: Option<Vec<ConversationTurn>>,
    pub context: Option<ContextData>,
    pub used_existing_context: Option<bool>,
    pub short_circuit_payload: Option<ShortCircuitPayload>,
    pub answer: Option<Answer>,
    pub final_citation_url: Option<String>,
    pub status: Option<WorkflowStatus>,
    pub result: Option<WorkflowResult>,
}

impl WorkflowState {
    pub fn new(
        variant: WorkflowVariant,
        chat_id: impl Into<String>,
        user_message: impl Into<String>,
        user_message_id: impl Into<String>,
        lang: impl Into<String>,
        selected_ai: impl Into<String>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_message: user_message.into(),
            user_message_id: user_message_id.into(),
            conversation_history: Vec::new(),
            lang: lang.into(),
            department: None,
            referring_url: None,
            selected_ai: selected_ai.into(),
            search_provider: None,
            override_user_id: None,
            translation_f: None,
            variant,
            start_time: None,
            redacted_text: None,
            translation_data: None,
            cleaned_history: None,
            context: None,
            used_existing_context: None,
            short_circuit_payload: None,
            answer: None,
            final_citation_url: None,
            status: None,
            result: None,
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_referring_url(mut self, url: impl Into<String>) -> Self {
        self.referring_url = Some(url.into());
        self
    }

    pub fn with_search_provider(mut self, provider: impl Into<String>) -> Self {
        self.search_provider = Some(provider.into());
        self
    }

    pub fn with_override_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.override_user_id = Some(user_id.into());
        self
    }

    pub fn with_translation_f(mut self, translation_f: impl Into<String>) -> Self {
        self.translation_f = Some(translation_f.into());
        self
    }

    /// The message text safe to hand to collaborators past the redact node.
    pub fn safe_message(&self) -> &str {
        self.redacted_text.as_deref().unwrap_or(&self.user_message)
    }

    /// Question in the canonical working language, once translation ran.
    pub fn translated_question(&self) -> &str {
        self.translation_data
            .as_ref()
            .map(|t| t.translated_text.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.safe_message())
    }

    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(v) = update.start_time {
            self.start_time = Some(v);
        }
        if let Some(v) = update.redacted_text {
            self.redacted_text = Some(v);
        }
        if let Some(v) = update.translation_data {
            self.translation_data = Some(v);
        }
        if let Some(v) = update.cleaned_history {
            self.cleaned_history = Some(v);
        }
        if let Some(v) = update.context {
            self.context = Some(v);
        }
        if let Some(v) = update.used_existing_context {
            self.used_existing_context = Some(v);
        }
        if let Some(v) = update.short_circuit_payload {
            self.short_circuit_payload = Some(v);
        }
        if let Some(v) = update.answer {
            self.answer = Some(v);
        }
        if let Some(v) = update.final_citation_url {
            self.final_citation_url = Some(v);
        }
        if let Some(v) = update.status {
            self.status = Some(v);
        }
        if let Some(v) = update.result {
            self.result = Some(v);
        }
    }
}

/// Partial update returned by a node. `Some` overwrites the field, `None`
/// leaves it as the previous node left it.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub start_time: Option<i64>,
    pub redacted_text: Option<String>,
    pub translation_data: Option<TranslationData>,
    pub cleaned_history: Option<Vec<ConversationTurn>>,
    pub context: Option<ContextData>,
    pub used_existing_context: Option<bool>,
    pub short_circuit_payload: Option<ShortCircuitPayload>,
    pub answer: Option<Answer>,
    pub final_citation_url: Option<String>,
    pub status: Option<WorkflowStatus>,
    pub result: Option<WorkflowResult>,
}

impl StateUpdate {
    pub fn status(status: WorkflowStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
