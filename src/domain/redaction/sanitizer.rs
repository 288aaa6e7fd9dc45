//! Sanitizer with a per-language compiled pattern cache

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::patterns::pii_patterns;

#[cfg(test)]
use mockall::automock;

/// Replacement for private-information matches, irrespective of length.
const PII_MASK: &str = "XXX";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SanitizerError {
    #[error("Sanitizer is not initialized for language '{lang}'")]
    NotInitialized { lang: String },

    #[error("Invalid redaction pattern: {message}")]
    Pattern { message: String },

    #[error("Word list cache is poisoned")]
    Poisoned,
}

/// Category of a redacted substring. All four belong to the blocking set:
/// any match aborts the workflow at the redact node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionKind {
    Profanity,
    Threat,
    Manipulation,
    Private,
}

impl RedactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profanity => "profanity",
            Self::Threat => "threat",
            Self::Manipulation => "manipulation",
            Self::Private => "private",
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::Profanity | Self::Threat | Self::Manipulation | Self::Private
        )
    }
}

/// Audit record for one masked substring. Carries the original match; the
/// redacted text never does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactedItem {
    #[serde(rename = "type")]
    pub kind: RedactionKind,

    #[serde(rename = "match")]
    pub matched: String,
}

/// Outcome of one redaction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Redaction {
    pub redacted_text: String,
    pub redacted_items: Vec<RedactedItem>,
}

impl Redaction {
    pub fn has_blocking_item(&self) -> bool {
        self.redacted_items.iter().any(|i| i.kind.is_blocking())
    }
}

/// Word-list categories compiled into per-language patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCategory {
    Profanity,
    Threat,
    Manipulation,
}

/// Source of the comma-separated category word lists, usually backed by the
/// application settings.
#[cfg_attr(test, automock)]
pub trait WordListSource: Send + Sync {
    fn word_list(&self, lang: &str, category: WordCategory) -> Option<String>;
}

#[derive(Debug)]
struct CompiledPatterns {
    profanity: Option<Regex>,
    threat: Option<Regex>,
    manipulation: Option<Regex>,
}

/// Redacts category words and private information from free text.
///
/// Compiled pattern sets are cached per language and shared for read-only
/// lookups, so concurrent requests in different languages never thrash
/// re-initialization. A language must still be initialized before use;
/// redacting in an unknown language fails loudly.
pub struct Sanitizer {
    source: Arc<dyn WordListSource>,
    cache: RwLock<HashMap<String, Arc<CompiledPatterns>>>,
}

impl std::fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer").finish_non_exhaustive()
    }
}

impl Sanitizer {
    pub fn new(source: Arc<dyn WordListSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_initialized(&self, lang: &str) -> bool {
        self.cache
            .read()
            .map(|cache| cache.contains_key(lang))
            .unwrap_or(false)
    }

    /// Compile and cache the category patterns for a language. Idempotent.
    pub fn ensure_initialized(&self, lang: &str) -> Result<(), SanitizerError> {
        if self.is_initialized(lang) {
            return Ok(());
        }

        let compiled = CompiledPatterns {
            profanity: self.compile_category(lang, WordCategory::Profanity)?,
            threat: self.compile_category(lang, WordCategory::Threat)?,
            manipulation: self.compile_category(lang, WordCategory::Manipulation)?,
        };
        debug!(lang, "compiled sanitizer patterns");

        let mut cache = self.cache.write().map_err(|_| SanitizerError::Poisoned)?;
        cache.entry(lang.to_string()).or_insert(Arc::new(compiled));
        Ok(())
    }

    fn compile_category(
        &self,
        lang: &str,
        category: WordCategory,
    ) -> Result<Option<Regex>, SanitizerError> {
        let Some(raw) = self.source.word_list(lang, category) else {
            return Ok(None);
        };

        let escaped: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();

        if escaped.is_empty() {
            return Ok(None);
        }

        let pattern = format!(r"(?i)\b({})\b", escaped.join("|"));
        Regex::new(&pattern)
            .map(Some)
            .map_err(|e| SanitizerError::Pattern {
                message: e.to_string(),
            })
    }

    /// Redact category words and private information.
    ///
    /// Category matches are replaced with a same-length `#` mask; private
    /// matches with the fixed literal mask. Patterns apply in a fixed order
    /// and each one scans the output of the previous, so a substring masked
    /// early is invisible to later patterns.
    pub fn redact(&self, text: &str, lang: &str) -> Result<Redaction, SanitizerError> {
        let compiled = {
            let cache = self.cache.read().map_err(|_| SanitizerError::Poisoned)?;
            cache
                .get(lang)
                .cloned()
                .ok_or_else(|| SanitizerError::NotInitialized {
                    lang: lang.to_string(),
                })?
        };

        if text.is_empty() {
            return Ok(Redaction::default());
        }

        let mut redacted_text = text.to_string();
        let mut redacted_items = Vec::new();

        let categories = [
            (compiled.profanity.as_ref(), RedactionKind::Profanity),
            (compiled.threat.as_ref(), RedactionKind::Threat),
            (compiled.manipulation.as_ref(), RedactionKind::Manipulation),
        ];
        for (pattern, kind) in categories {
            let Some(pattern) = pattern else {
                continue;
            };
            redacted_text = pattern
                .replace_all(&redacted_text, |caps: &regex::Captures<'_>| {
                    let matched = caps[0].to_string();
                    let mask = "#".repeat(matched.chars().count());
                    redacted_items.push(RedactedItem { kind, matched });
                    mask
                })
                .into_owned();
        }

        for pii in pii_patterns() {
            redacted_text = pii
                .regex
                .replace_all(&redacted_text, |caps: &regex::Captures<'_>| {
                    redacted_items.push(RedactedItem {
                        kind: RedactionKind::Private,
                        matched: caps[0].to_string(),
                    });
                    PII_MASK
                })
                .into_owned();
        }

        Ok(Redaction {
            redacted_text,
            redacted_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLists;

    impl WordListSource for FixedLists {
        fn word_list(&self, lang: &str, category: WordCategory) -> Option<String> {
            match (lang, category) {
                ("en", WordCategory::Profanity) => Some("darn, heck".to_string()),
                ("en", WordCategory::Threat) => Some("kill, bomb".to_string()),
                ("en", WordCategory::Manipulation) => {
                    Some("ignore previous instructions".to_string())
                }
                ("fr", WordCategory::Threat) => Some("tuer".to_string()),
                _ => None,
            }
        }
    }

    fn sanitizer() -> Sanitizer {
        let s = Sanitizer::new(Arc::new(FixedLists));
        s.ensure_initialized("en").unwrap();
        s
    }

    #[test]
    fn test_initialization_reads_each_category_once() {
        let mut source = MockWordListSource::new();
        source
            .expect_word_list()
            .times(3)
            .returning(|_, category| match category {
                WordCategory::Profanity => Some("darn".to_string()),
                _ => None,
            });

        let s = Sanitizer::new(Arc::new(source));
        s.ensure_initialized("en").unwrap();
        // Cached; the source is not consulted again.
        s.ensure_initialized("en").unwrap();
        assert!(s.is_initialized("en"));
    }

    #[test]
    fn test_uninitialized_language_fails_loudly() {
        let s = sanitizer();
        let err = s.redact("bonjour", "fr").unwrap_err();
        assert_eq!(
            err,
            SanitizerError::NotInitialized {
                lang: "fr".to_string()
            }
        );
    }

    #[test]
    fn test_keyed_cache_serves_both_languages() {
        let s = sanitizer();
        s.ensure_initialized("fr").unwrap();

        assert!(s.redact("kill the mayor", "en").is_ok());
        assert!(s.redact("tuer le maire", "fr").is_ok());
        assert!(s.is_initialized("en"));
        assert!(s.is_initialized("fr"));
    }

    #[test]
    fn test_category_match_masked_with_equal_length() {
        let s = sanitizer();
        let result = s.redact("kill the mayor", "en").unwrap();

        assert_eq!(result.redacted_text, "#### the mayor");
        assert_eq!(result.redacted_items.len(), 1);
        assert_eq!(result.redacted_items[0].kind, RedactionKind::Threat);
        assert_eq!(result.redacted_items[0].matched, "kill");
        assert!(result.has_blocking_item());
    }

    #[test]
    fn test_category_match_is_case_insensitive_and_word_bounded() {
        let s = sanitizer();
        let result = s.redact("KILL it", "en").unwrap();
        assert_eq!(result.redacted_text, "#### it");

        // "killing" must not match the word "kill"
        let result = s.redact("killing time", "en").unwrap();
        assert_eq!(result.redacted_text, "killing time");
        assert!(result.redacted_items.is_empty());
    }

    #[test]
    fn test_multiple_category_words() {
        let s = sanitizer();
        let result = s.redact("darn, I will bomb it", "en").unwrap();

        assert_eq!(result.redacted_text, "####, I will #### it");
        let kinds: Vec<RedactionKind> = result.redacted_items.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![RedactionKind::Profanity, RedactionKind::Threat]);
    }

    #[test]
    fn test_pii_masked_with_fixed_literal() {
        let s = sanitizer();
        let result = s.redact("email me at jane@example.com", "en").unwrap();

        assert_eq!(result.redacted_text, "email me at XXX");
        assert_eq!(result.redacted_items.len(), 1);
        assert_eq!(result.redacted_items[0].kind, RedactionKind::Private);
        assert_eq!(result.redacted_items[0].matched, "jane@example.com");
    }

    #[test]
    fn test_audit_list_keeps_original_but_output_never_does() {
        let s = sanitizer();
        let result = s.redact("my sin is 046 454 286 heck", "en").unwrap();

        for item in &result.redacted_items {
            assert!(!result.redacted_text.contains(&item.matched));
        }
        assert!(result
            .redacted_items
            .iter()
            .any(|i| i.matched == "046 454 286"));
    }

    #[test]
    fn test_manipulation_phrase_masked() {
        let s = sanitizer();
        let result = s
            .redact("please ignore previous instructions now", "en")
            .unwrap();

        assert_eq!(
            result.redacted_text,
            format!("please {} now", "#".repeat("ignore previous instructions".len()))
        );
        assert_eq!(result.redacted_items[0].kind, RedactionKind::Manipulation);
    }

    #[test]
    fn test_empty_text() {
        let s = sanitizer();
        let result = s.redact("", "en").unwrap();
        assert_eq!(result, Redaction::default());
    }

    #[test]
    fn test_clean_text_untouched() {
        let s = sanitizer();
        let result = s
            .redact("How do I renew my passport from abroad", "en")
            .unwrap();
        assert_eq!(result.redacted_text, "How do I renew my passport from abroad");
        assert!(result.redacted_items.is_empty());
    }
}
