//! Answer record types

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification assigned by the answer-generation model through its
/// response tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerType {
    #[default]
    Normal,
    NotGc,
    PtMuni,
    ClarifyingQuestion,
}

impl AnswerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::NotGc => "not-gc",
            Self::PtMuni => "pt-muni",
            Self::ClarifyingQuestion => "clarifying-question",
        }
    }

    /// The caller surfaces clarification requests differently from answers;
    /// the original convention is any type whose name contains "question".
    pub fn is_question(&self) -> bool {
        self.as_str().contains("question")
    }
}

impl std::fmt::Display for AnswerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed answer produced by [`parse_response`](super::parse_response).
///
/// `sentences` always has exactly four slots; missing ones are empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerRecord {
    pub answer_type: AnswerType,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preliminary_checks: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_head: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_url: Option<String>,

    #[serde(default)]
    pub paragraphs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_rating: Option<String>,

    pub sentences: [String; 4],
}

impl Default for AnswerRecord {
    fn default() -> Self {
        Self {
            answer_type: AnswerType::Normal,
            content: String::new(),
            preliminary_checks: None,
            english_answer: None,
            citation_head: None,
            citation_url: None,
            paragraphs: Vec::new(),
            confidence_rating: None,
            sentences: Default::default(),
        }
    }
}

/// One tool call made by the answer-generation model, as reported in its
/// usage metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInvocation {
    pub tool: String,

    pub status: String,

    #[serde(default)]
    pub input: Value,
}

impl ToolInvocation {
    /// URL fetched by a completed page-download call, if any.
    pub fn downloaded_url(&self) -> Option<&str> {
        if self.tool == "downloadWebPage" && self.status == "completed" {
            self.input.get("url").and_then(Value::as_str)
        } else {
            None
        }
    }
}

/// Model/usage metadata attached to a generated answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,

    #[serde(default)]
    pub tools: Vec<ToolInvocation>,
}

/// A complete answer: the parsed record plus generation metadata and the
/// question-language fields the caller needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    #[serde(flatten)]
    pub record: AnswerRecord,

    #[serde(flatten)]
    pub metadata: GenerationMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_question: Option<String>,

    /// Conversation-integrity signature computed upstream, threaded through
    /// to the caller-visible result untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_signature: Option<String>,
}

impl Answer {
    pub fn from_record(record: AnswerRecord) -> Self {
        Self {
            record,
            ..Default::default()
        }
    }

    /// URLs already fetched successfully during answer generation. Citations
    /// pointing at one of these are trusted without a live check.
    pub fn verified_urls(&self) -> HashSet<String> {
        self.metadata
            .tools
            .iter()
            .filter_map(|t| t.downloaded_url().map(String::from))
            .collect()
    }
}
