//! Hand-rolled mock collaborators shared by the node and engine tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::config::{RedactionSettings, WordLists};
use crate::domain::context::TranslationData;
use crate::domain::conversation::ConversationTurn;
use crate::domain::error::DomainError;
use crate::domain::redaction::Sanitizer;
use crate::domain::traits::{
    AnswerGenerator, ContextRequest, ContextSummarizer, ContextSummary, EventSink, GeneratedText,
    GenerationRequest, GraphEvent, InteractionRecord, PersistenceSink, PiiCheck, PiiDetector,
    ScenarioOverride, ScenarioOverrideLookup, SearchOutcome, SearchProvider, SearchRequest,
    ShortQueryValidator, SimilarAnswerMatch, SimilarAnswerRequest, SimilarQuestionsOptions,
    SimilarQuestionsProvider, SimilarityMatcher, TranslationOutcome, TranslationProvider,
    UrlCheck, UrlValidator, UserIdentity,
};
use crate::domain::workflow::ShortQueryValidation;

use super::event_log::EventLogger;
use super::nodes::NodeLibraryDeps;

#[derive(Debug, Default)]
pub struct MockShortQueryValidator {
    pub reject_with: Option<String>,
}

#[async_trait]
impl ShortQueryValidator for MockShortQueryValidator {
    async fn validate(
        &self,
        _history: &[ConversationTurn],
        _message: &str,
        _lang: &str,
        _department: Option<&str>,
    ) -> Result<(), ShortQueryValidation> {
        match &self.reject_with {
            Some(message) => Err(ShortQueryValidation::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockPiiDetector {
    pub result: PiiCheck,
}

#[async_trait]
impl PiiDetector for MockPiiDetector {
    async fn check(&self, _message: &str, _agent_type: &str) -> Result<PiiCheck, DomainError> {
        Ok(self.result.clone())
    }
}

/// Passthrough translator unless told to block or report a language.
#[derive(Debug, Default)]
pub struct MockTranslator {
    pub blocked: bool,
    pub detected_language: Option<String>,
}

#[async_trait]
impl TranslationProvider for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        desired_language: &str,
        _agent_type: &str,
        _translation_context: &[String],
    ) -> Result<TranslationOutcome, DomainError> {
        if self.blocked {
            return Ok(TranslationOutcome::Blocked);
        }
        let mut data = TranslationData::passthrough(text, desired_language);
        data.original_language = self.detected_language.clone();
        Ok(TranslationOutcome::Translated(data))
    }
}

#[derive(Debug, Default)]
pub struct MockSearchProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, _request: SearchRequest) -> Result<SearchOutcome, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SearchOutcome {
            query: Some("mock search query".to_string()),
            results: json!([{"title": "Mock result"}]),
            system_prompt: Some("You are a helpful assistant.".to_string()),
        })
    }
}

#[derive(Debug, Default)]
pub struct MockContextSummarizer {
    pub department: Option<String>,
}

#[async_trait]
impl ContextSummarizer for MockContextSummarizer {
    async fn summarize(&self, _request: ContextRequest) -> Result<ContextSummary, DomainError> {
        Ok(ContextSummary {
            topic: Some("Benefits".to_string()),
            topic_url: Some("https://www.canada.ca/en/services/benefits.html".to_string()),
            department: self.department.clone(),
            department_url: None,
            model: Some("mock-context-model".to_string()),
            input_tokens: Some(100),
            output_tokens: Some(20),
        })
    }
}

#[derive(Debug, Default)]
pub struct MockOverrideLookup {
    pub active: Option<ScenarioOverride>,
}

#[async_trait]
impl ScenarioOverrideLookup for MockOverrideLookup {
    async fn active_override(
        &self,
        _user_id: &str,
        _department_key: &str,
    ) -> Result<Option<ScenarioOverride>, DomainError> {
        Ok(self.active.clone())
    }
}

#[derive(Debug, Default)]
pub struct MockSimilarityMatcher {
    pub matched: Option<SimilarAnswerMatch>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl SimilarityMatcher for MockSimilarityMatcher {
    async fn find_similar_answer(
        &self,
        _request: SimilarAnswerRequest,
    ) -> Result<Option<SimilarAnswerMatch>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.matched.clone())
    }
}

#[derive(Debug, Default)]
pub struct MockSimilarQuestionsProvider {
    pub block: String,
    pub fail: bool,
}

#[async_trait]
impl SimilarQuestionsProvider for MockSimilarQuestionsProvider {
    async fn similar_questions_context(
        &self,
        _question: &str,
        _options: SimilarQuestionsOptions,
    ) -> Result<String, DomainError> {
        if self.fail {
            return Err(DomainError::provider("similar-questions", "unavailable"));
        }
        Ok(self.block.clone())
    }
}

/// Returns a canned response and records every request it receives.
#[derive(Debug)]
pub struct MockAnswerGenerator {
    pub response: String,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl Default for MockAnswerGenerator {
    fn default() -> Self {
        Self {
            response: "<answer>Mock answer content.</answer>\
                       <citation-url>https://www.canada.ca/en/services.html</citation-url>"
                .to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AnswerGenerator for MockAnswerGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedText, DomainError> {
        self.requests
            .lock()
            .map_err(|_| DomainError::internal("mock lock poisoned"))?
            .push(request);
        Ok(GeneratedText {
            content: self.response.clone(),
            model: Some("mock-answer-model".to_string()),
            input_tokens: Some(500),
            output_tokens: Some(80),
            tools: Vec::new(),
            history_signature: Some("sig-abc".to_string()),
        })
    }
}

#[derive(Debug)]
pub struct MockUrlValidator {
    pub valid: bool,
    pub fallback: Option<String>,
    pub validate_calls: AtomicUsize,
}

impl Default for MockUrlValidator {
    fn default() -> Self {
        Self {
            valid: true,
            fallback: None,
            validate_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl UrlValidator for MockUrlValidator {
    async fn validate_url(&self, url: &str, _chat_id: &str) -> Result<UrlCheck, DomainError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(UrlCheck {
            is_valid: self.valid,
            url: Some(url.to_string()),
        })
    }

    async fn search_fallback(
        &self,
        _lang: &str,
        _question: &str,
        _department: Option<&str>,
        _translation_f: Option<&str>,
        _chat_id: &str,
    ) -> Result<Option<String>, DomainError> {
        Ok(self.fallback.clone())
    }
}

#[derive(Debug, Default)]
pub struct MockPersistenceSink {
    pub fail: bool,
    pub records: Mutex<Vec<(InteractionRecord, Option<UserIdentity>)>>,
}

#[async_trait]
impl PersistenceSink for MockPersistenceSink {
    async fn persist_interaction(
        &self,
        record: &InteractionRecord,
        user: Option<&UserIdentity>,
    ) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::storage("write failed"));
        }
        self.records
            .lock()
            .map_err(|_| DomainError::internal("mock lock poisoned"))?
            .push((record.clone(), user.cloned()));
        Ok(())
    }
}

/// Captures every pipeline event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    pub events: Mutex<Vec<GraphEvent>>,
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &GraphEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

pub fn test_sanitizer() -> Arc<Sanitizer> {
    let settings = RedactionSettings::default().with_language(
        "en",
        WordLists {
            profanity: "darn, heck".to_string(),
            threat: "kill, bomb".to_string(),
            manipulation: "ignore previous instructions".to_string(),
        },
    );
    Arc::new(Sanitizer::new(Arc::new(settings)))
}

/// A full dependency set with permissive defaults; tests override the
/// collaborators they care about.
pub fn test_deps() -> NodeLibraryDeps {
    NodeLibraryDeps {
        sanitizer: test_sanitizer(),
        short_query_validator: Arc::new(MockShortQueryValidator::default()),
        pii_detector: Arc::new(MockPiiDetector::default()),
        translator: Arc::new(MockTranslator::default()),
        search_provider: Arc::new(MockSearchProvider::default()),
        context_summarizer: Arc::new(MockContextSummarizer::default()),
        scenario_overrides: Arc::new(MockOverrideLookup::default()),
        similarity_matcher: Arc::new(MockSimilarityMatcher::default()),
        similar_questions: Arc::new(MockSimilarQuestionsProvider::default()),
        answer_generator: Arc::new(MockAnswerGenerator::default()),
        url_validator: Arc::new(MockUrlValidator::default()),
        persistence: Arc::new(MockPersistenceSink::default()),
        logger: EventLogger::new(),
    }
}
