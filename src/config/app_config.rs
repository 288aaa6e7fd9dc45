use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::redaction::{WordCategory, WordListSource};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub redaction: RedactionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Per-language word lists feeding the sanitizer's category patterns.
///
/// Each list is a comma-separated string, matching the settings format the
/// moderation team maintains (`redaction.<category>.<lang>` keys).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RedactionSettings {
    #[serde(default)]
    pub languages: HashMap<String, WordLists>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WordLists {
    #[serde(default)]
    pub profanity: String,

    #[serde(default)]
    pub threat: String,

    #[serde(default)]
    pub manipulation: String,
}

impl RedactionSettings {
    pub fn with_language(mut self, lang: impl Into<String>, lists: WordLists) -> Self {
        self.languages.insert(lang.into(), lists);
        self
    }
}

impl WordListSource for RedactionSettings {
    fn word_list(&self, lang: &str, category: WordCategory) -> Option<String> {
        let lists = self.languages.get(lang)?;
        let raw = match category {
            WordCategory::Profanity => &lists.profanity,
            WordCategory::Threat => &lists.threat,
            WordCategory::Manipulation => &lists.manipulation,
        };
        if raw.trim().is_empty() {
            None
        } else {
            Some(raw.clone())
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.redaction.languages.is_empty());
    }

    #[test]
    fn test_word_list_source_lookup() {
        let settings = RedactionSettings::default().with_language(
            "en",
            WordLists {
                profanity: "darn, heck".to_string(),
                threat: String::new(),
                manipulation: "ignore previous instructions".to_string(),
            },
        );

        assert_eq!(
            settings.word_list("en", WordCategory::Profanity).as_deref(),
            Some("darn, heck")
        );
        assert!(settings.word_list("en", WordCategory::Threat).is_none());
        assert!(settings.word_list("fr", WordCategory::Profanity).is_none());
    }
}
