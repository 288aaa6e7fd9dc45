//! Pattern-based text sanitization
//!
//! Detects and masks profanity, threats, manipulation attempts and private
//! information before any text leaves the moderation stage. Every match is
//! recorded in an audit list carrying the original substring; the redacted
//! output never re-exposes it.

mod patterns;
mod sanitizer;

pub use patterns::{pii_patterns, PiiPattern};
pub use sanitizer::{
    Redaction, RedactedItem, RedactionKind, Sanitizer, SanitizerError, WordCategory,
    WordListSource,
};
