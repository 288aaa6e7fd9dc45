//! Conversation history types
//!
//! A conversation is an ordered sequence of prior turns. AI turns may embed a
//! snapshot of the interaction that produced them, which later runs inspect
//! for context reuse and short-circuit eligibility.

use serde::{Deserialize, Serialize};

use super::answer::AnswerRecord;
use super::context::ContextData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,

    #[serde(default)]
    pub text: String,

    /// Turns that errored client-side are kept in the history but excluded
    /// from all server-side processing.
    #[serde(default)]
    pub error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionSnapshot>,
}

/// The persisted interaction an AI turn refers back to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextData>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            error: false,
            interaction: None,
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
            error: false,
            interaction: None,
        }
    }

    pub fn with_error(mut self) -> Self {
        self.error = true;
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionSnapshot) -> Self {
        self.interaction = Some(interaction);
        self
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_ai(&self) -> bool {
        self.sender == Sender::Ai
    }
}

/// Drop errored turns; every node that reads history sees this view.
pub fn clean_history(history: &[ConversationTurn]) -> Vec<ConversationTurn> {
    history.iter().filter(|t| !t.error).cloned().collect()
}

/// Prior user-authored turns used as context for language detection during
/// translation. The message being translated is not part of the history, so
/// every stored user turn qualifies.
pub fn translation_context(history: &[ConversationTurn]) -> Vec<String> {
    history
        .iter()
        .filter(|t| t.is_user() && !t.error && !t.text.is_empty())
        .map(|t| t.text.clone())
        .collect()
}
