//! Structured answers and the tag-based answer-format parser

mod parser;
mod record;

pub use parser::{parse_response, parse_sentences};
pub use record::{Answer, AnswerRecord, AnswerType, GenerationMetadata, ToolInvocation};
