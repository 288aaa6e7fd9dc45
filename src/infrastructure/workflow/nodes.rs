//! Node library
//!
//! One implementation of every pipeline stage, shared by all workflow
//! variants. Each node reads the current state and returns a partial update;
//! the engine owns sequencing and merging.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::domain::answer::{parse_response, Answer, AnswerType, GenerationMetadata};
use crate::domain::context::{determine_output_lang, ContextData};
use crate::domain::conversation::{clean_history, translation_context};
use crate::domain::error::DomainError;
use crate::domain::redaction::Sanitizer;
use crate::domain::traits::{
    AnswerGenerator, ContextRequest, ContextSummarizer, GenerationRequest, InteractionRecord,
    PersistenceSink, PiiDetector, ScenarioOverrideLookup, SearchProvider, SearchRequest,
    ShortQueryValidator, SimilarAnswerRequest, SimilarQuestionsOptions, SimilarQuestionsProvider,
    SimilarityMatcher, TranslationOutcome, TranslationProvider, UrlValidator,
};
use crate::domain::workflow::{
    NodeKind, RedactionError, ShortCircuitPayload, StateUpdate, WorkflowError, WorkflowResult,
    WorkflowState, WorkflowStatus,
};

use super::event_log::EventLogger;
use super::request_context::RequestContext;

/// Fixed-length placeholder used when the caller-visible text must be
/// discarded entirely (blocking PII, translation content-safety trip).
const BLOCKED_MASK: &str = "#############";

/// Canonical working language for retrieval and generation.
const WORKING_LANGUAGE: &str = "en";

/// External collaborator set shared by every node.
pub struct NodeLibraryDeps {
    pub sanitizer: Arc<Sanitizer>,
    pub short_query_validator: Arc<dyn ShortQueryValidator>,
    pub pii_detector: Arc<dyn PiiDetector>,
    pub translator: Arc<dyn TranslationProvider>,
    pub search_provider: Arc<dyn SearchProvider>,
    pub context_summarizer: Arc<dyn ContextSummarizer>,
    pub scenario_overrides: Arc<dyn ScenarioOverrideLookup>,
    pub similarity_matcher: Arc<dyn SimilarityMatcher>,
    pub similar_questions: Arc<dyn SimilarQuestionsProvider>,
    pub answer_generator: Arc<dyn AnswerGenerator>,
    pub url_validator: Arc<dyn UrlValidator>,
    pub persistence: Arc<dyn PersistenceSink>,
    pub logger: EventLogger,
}

pub struct NodeLibrary {
    deps: NodeLibraryDeps,
}

impl NodeLibrary {
    pub fn new(deps: NodeLibraryDeps) -> Self {
        Self { deps }
    }

    pub fn logger(&self) -> &EventLogger {
        &self.deps.logger
    }

    pub async fn execute(
        &self,
        kind: NodeKind,
        state: &WorkflowState,
        ctx: &RequestContext,
    ) -> Result<StateUpdate, WorkflowError> {
        self.deps.logger.debug(
            &state.chat_id,
            &format!("node:{} input", kind.name()),
            json!({ "status": state.status }),
        );

        let update = match kind {
            NodeKind::Init => self.init(state),
            NodeKind::Validate => self.validate(state).await?,
            NodeKind::Redact => self.redact(state).await?,
            NodeKind::Translate => self.translate(state).await?,
            NodeKind::ShortCircuit => self.short_circuit(state, ctx).await?,
            NodeKind::Context => self.context(state).await?,
            NodeKind::SimilarQuestions => self.similar_questions(state).await?,
            NodeKind::Answer => self.answer(state).await?,
            NodeKind::Verify => self.verify(state).await?,
            NodeKind::Persist => self.persist(state, ctx).await?,
        };

        self.deps.logger.debug(
            &state.chat_id,
            &format!("node:{} output", kind.name()),
            json!({
                "status": update.status.or(state.status),
                "shortCircuit": state.short_circuit_payload.is_some()
                    || update.short_circuit_payload.is_some(),
            }),
        );

        Ok(update)
    }

    fn init(&self, _state: &WorkflowState) -> StateUpdate {
        StateUpdate {
            start_time: Some(Utc::now().timestamp_millis()),
            status: Some(WorkflowStatus::ModeratingQuestion),
            ..Default::default()
        }
    }

    async fn validate(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let cleaned = clean_history(&state.conversation_history);
        self.deps
            .short_query_validator
            .validate(
                &cleaned,
                &state.user_message,
                &state.lang,
                state.department.as_deref(),
            )
            .await?;

        Ok(StateUpdate {
            cleaned_history: Some(cleaned),
            ..Default::default()
        })
    }

    /// Pattern redaction first; any audit item aborts the run. The
    /// model-backed PII detector then gets a second, independent look.
    async fn redact(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        self.deps.sanitizer.ensure_initialized(&state.lang)?;
        let redaction = self.deps.sanitizer.redact(&state.user_message, &state.lang)?;

        if redaction.has_blocking_item() {
            self.deps.logger.info(
                &state.chat_id,
                "blocked content detected",
                json!({ "items": redaction.redacted_items.len() }),
            );
            return Err(RedactionError::new(
                "Blocked content detected",
                redaction.redacted_text,
                redaction.redacted_items,
            )
            .into());
        }

        let check = self
            .deps
            .pii_detector
            .check(&redaction.redacted_text, &state.selected_ai)
            .await
            .map_err(|e| WorkflowError::node("redact", e))?;

        if check.blocked {
            return Err(
                RedactionError::new("Blocked private information", BLOCKED_MASK, vec![]).into(),
            );
        }
        if let Some(pii) = check.pii {
            return Err(RedactionError::new("Private information detected", pii, vec![]).into());
        }

        Ok(StateUpdate {
            redacted_text: Some(redaction.redacted_text),
            ..Default::default()
        })
    }

    async fn translate(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let context = translation_context(&state.conversation_history);
        let outcome = self
            .deps
            .translator
            .translate(
                state.safe_message(),
                WORKING_LANGUAGE,
                &state.selected_ai,
                &context,
            )
            .await
            .map_err(|e| WorkflowError::node("translate", e))?;

        match outcome {
            TranslationOutcome::Translated(data) => Ok(StateUpdate {
                translation_data: Some(data),
                ..Default::default()
            }),
            TranslationOutcome::Blocked => Err(RedactionError::new(
                "Translation blocked by content filter",
                BLOCKED_MASK,
                vec![],
            )
            .into()),
        }
    }

    /// First-turn-only instant answering. A hit persists immediately and
    /// flags the engine to jump straight to verification.
    async fn short_circuit(
        &self,
        state: &WorkflowState,
        ctx: &RequestContext,
    ) -> Result<StateUpdate, WorkflowError> {
        let history = state
            .cleaned_history
            .as_deref()
            .unwrap_or(&state.conversation_history);
        let has_ai_reply = history.iter().any(|t| {
            t.is_ai() || t.interaction.as_ref().is_some_and(|i| i.answer.is_some())
        });
        if has_ai_reply {
            return Ok(StateUpdate::status(WorkflowStatus::BuildingContext));
        }

        let mut questions: Vec<String> = history
            .iter()
            .filter_map(|t| {
                if t.is_user() {
                    Some(t.text.as_str())
                } else {
                    t.interaction.as_ref().and_then(|i| i.question.as_deref())
                }
            })
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from)
            .collect();
        questions.push(state.safe_message().to_string());

        let detected_language = state
            .translation_data
            .as_ref()
            .and_then(|t| t.original_language.clone());

        let matched = self
            .deps
            .similarity_matcher
            .find_similar_answer(SimilarAnswerRequest {
                chat_id: state.chat_id.clone(),
                questions,
                agent_type: state.selected_ai.clone(),
                page_language: Some(state.lang.clone()),
                detected_language: detected_language.clone(),
            })
            .await
            .map_err(|e| WorkflowError::node("shortCircuit", e))?;

        let Some(matched) = matched else {
            return Ok(StateUpdate::status(WorkflowStatus::BuildingContext));
        };

        self.deps.logger.info(
            &state.chat_id,
            "similar answer matched",
            json!({ "similarity": matched.similarity }),
        );

        // The matched answer was already classified when first served; it
        // is replayed as a normal answer with its stored citation.
        let mut record = parse_response(&matched.answer);
        record.answer_type = AnswerType::Normal;
        if record.english_answer.is_none() {
            record.english_answer = matched.english_answer.clone();
        }
        let citation = matched.citation.as_ref();
        record.citation_url = citation
            .and_then(|c| c.ai_citation_url.clone())
            .or(record.citation_url);
        if record.citation_head.is_none() {
            record.citation_head = citation.and_then(|c| c.citation_head.clone());
        }
        let final_citation_url = citation
            .and_then(|c| c.provided_citation_url.clone())
            .or_else(|| record.citation_url.clone());

        let mut answer = Answer::from_record(record);
        answer.question_language = detected_language;
        answer.english_question = Some(state.translated_question().to_string());

        let context = ContextData {
            search_provider: state.search_provider.clone(),
            translated_question: Some(state.translated_question().to_string()),
            lang: Some(state.lang.clone()),
            output_lang: Some(determine_output_lang(
                &state.lang,
                state.translation_data.as_ref(),
            )),
            original_lang: answer.question_language.clone(),
            original_user_message: Some(state.safe_message().to_string()),
            ..Default::default()
        };

        let response_time = state
            .start_time
            .map(|start| Utc::now().timestamp_millis() - start)
            .unwrap_or_default();

        let payload = ShortCircuitPayload {
            answer: answer.clone(),
            context: context.clone(),
            final_citation_url: final_citation_url.clone(),
            chat_id: state.chat_id.clone(),
            page_language: state.lang.clone(),
            response_time,
            instant_answer_chat_id: matched.chat_id.clone(),
            instant_answer_interaction_id: matched.interaction_id.clone(),
        };

        // Audit persistence must not fail the user-visible path.
        let record = self.interaction_record(state, &payload);
        if let Err(e) = self
            .deps
            .persistence
            .persist_interaction(&record, ctx.user.as_ref())
            .await
        {
            self.deps.logger.warn(
                &state.chat_id,
                "instant answer persistence failed",
                json!({ "error": e.to_string() }),
            );
        }

        Ok(StateUpdate {
            short_circuit_payload: Some(payload),
            answer: Some(answer),
            context: Some(context),
            final_citation_url,
            status: Some(WorkflowStatus::GeneratingAnswer),
            ..Default::default()
        })
    }

    fn interaction_record(
        &self,
        state: &WorkflowState,
        payload: &ShortCircuitPayload,
    ) -> InteractionRecord {
        InteractionRecord {
            chat_id: state.chat_id.clone(),
            selected_ai: state.selected_ai.clone(),
            question: state.safe_message().to_string(),
            user_message_id: Some(state.user_message_id.clone()),
            referring_url: state.referring_url.clone(),
            answer: Some(payload.answer.clone()),
            final_citation_url: payload.final_citation_url.clone(),
            context: Some(payload.context.clone()),
            workflow: state.variant.wire_name().to_string(),
            page_language: state.lang.clone(),
            response_time: payload.response_time,
            search_provider: state.search_provider.clone(),
            instant_answer_chat_id: payload.instant_answer_chat_id.clone(),
            instant_answer_interaction_id: payload.instant_answer_interaction_id.clone(),
        }
    }

    /// Context for the answer step: reused from the previous turn when the
    /// variant allows it, freshly derived otherwise. The status update
    /// announces the phase the caller is about to watch, not the one that
    /// just ran.
    async fn context(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        if state.variant.reuses_context() {
            if let Some(existing) = self.reusable_context(state) {
                self.deps.logger.info(
                    &state.chat_id,
                    "reusing context from previous turn",
                    json!({ "searchQuery": existing.search_query }),
                );
                let refreshed = self.refresh_context(existing, state);
                return Ok(StateUpdate {
                    context: Some(refreshed),
                    used_existing_context: Some(true),
                    status: Some(WorkflowStatus::GeneratingAnswer),
                    ..Default::default()
                });
            }
        }

        let derived = self.derive_context(state).await?;
        Ok(StateUpdate {
            context: Some(derived),
            used_existing_context: Some(false),
            status: Some(WorkflowStatus::GeneratingAnswer),
            ..Default::default()
        })
    }

    /// The last AI turn's context is reusable when it answered (rather than
    /// asked back) and carries a search query.
    fn reusable_context(&self, state: &WorkflowState) -> Option<ContextData> {
        let history = state
            .cleaned_history
            .as_deref()
            .unwrap_or(&state.conversation_history);
        let interaction = history
            .iter()
            .rev()
            .find(|t| t.is_ai())?
            .interaction
            .as_ref()?;

        let answered = interaction
            .answer
            .as_ref()
            .is_some_and(|a| !a.answer_type.is_question());
        let context = interaction.context.as_ref()?;
        (answered && context.has_search_query()).then(|| context.clone())
    }

    fn refresh_context(&self, mut context: ContextData, state: &WorkflowState) -> ContextData {
        context.translated_question = Some(state.translated_question().to_string());
        context.lang = Some(state.lang.clone());
        context.output_lang = Some(determine_output_lang(
            &state.lang,
            state.translation_data.as_ref(),
        ));
        context.original_lang = state
            .translation_data
            .as_ref()
            .and_then(|t| t.original_language.clone());
        context.original_user_message = Some(state.safe_message().to_string());
        context
    }

    async fn derive_context(&self, state: &WorkflowState) -> Result<ContextData, WorkflowError> {
        let search = self
            .deps
            .search_provider
            .search(SearchRequest {
                chat_id: state.chat_id.clone(),
                search_service: state.search_provider.clone(),
                agent_type: state.selected_ai.clone(),
                referring_url: state.referring_url.clone(),
                translation_data: state.translation_data.clone(),
                page_language: state.lang.clone(),
            })
            .await
            .map_err(|e| WorkflowError::node("context", e))?;

        let mut system_prompt = search.system_prompt.clone().unwrap_or_default();

        let summary = self
            .deps
            .context_summarizer
            .summarize(ContextRequest {
                chat_id: state.chat_id.clone(),
                message: state.translated_question().to_string(),
                system_prompt: system_prompt.clone(),
                search_results: search.results.clone(),
                provider: state.selected_ai.clone(),
                language: state.lang.clone(),
            })
            .await
            .map_err(|e| WorkflowError::node("context", e))?;

        if let (Some(user_id), Some(department)) =
            (state.override_user_id.as_deref(), summary.department.as_deref())
        {
            match self
                .deps
                .scenario_overrides
                .active_override(user_id, department)
                .await
            {
                Ok(Some(scenario)) => {
                    self.deps.logger.info(
                        &state.chat_id,
                        "scenario override applied",
                        json!({ "overrideId": scenario.id }),
                    );
                    system_prompt = scenario.override_text;
                }
                Ok(None) => {}
                Err(e) => {
                    self.deps.logger.warn(
                        &state.chat_id,
                        "scenario override lookup failed",
                        json!({ "error": e.to_string() }),
                    );
                }
            }
        }

        Ok(ContextData {
            topic: summary.topic,
            topic_url: summary.topic_url,
            department: summary.department,
            department_url: summary.department_url,
            search_query: search.query,
            system_prompt,
            search_results: search.results,
            search_provider: state.search_provider.clone(),
            translated_question: Some(state.translated_question().to_string()),
            lang: Some(state.lang.clone()),
            output_lang: Some(determine_output_lang(
                &state.lang,
                state.translation_data.as_ref(),
            )),
            original_lang: state
                .translation_data
                .as_ref()
                .and_then(|t| t.original_language.clone()),
            original_user_message: Some(state.safe_message().to_string()),
            similar_questions: String::new(),
            model: summary.model,
            input_tokens: summary.input_tokens,
            output_tokens: summary.output_tokens,
        })
    }

    /// Best-effort prompt enrichment; failures downgrade to a warning.
    async fn similar_questions(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let Some(context) = state.context.as_ref() else {
            return Ok(StateUpdate::default());
        };

        let mut enriched = context.clone();
        match self
            .deps
            .similar_questions
            .similar_questions_context(
                state.translated_question(),
                SimilarQuestionsOptions {
                    provider: state.search_provider.clone(),
                    language: Some(state.lang.clone()),
                },
            )
            .await
        {
            Ok(block) => enriched.similar_questions = block,
            Err(e) => {
                self.deps.logger.warn(
                    &state.chat_id,
                    "similar questions lookup failed",
                    json!({ "error": e.to_string() }),
                );
                enriched.similar_questions = String::new();
            }
        }

        Ok(StateUpdate {
            context: Some(enriched),
            ..Default::default()
        })
    }

    async fn answer(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let context = state.context.as_ref().ok_or_else(|| {
            WorkflowError::node("answer", DomainError::internal("no context derived"))
        })?;

        let token = output_lang_token(context.output_lang.as_deref());
        let mut message = format!(
            "{}\n<output-lang>{}</output-lang>",
            state.translated_question(),
            token
        );
        if let Some(url) = state.referring_url.as_deref() {
            message.push_str(&format!("\n<referring-url>{url}</referring-url>"));
        }

        let generated = self
            .deps
            .answer_generator
            .generate(GenerationRequest {
                chat_id: state.chat_id.clone(),
                provider: state.selected_ai.clone(),
                message,
                conversation_history: state
                    .cleaned_history
                    .clone()
                    .unwrap_or_else(|| state.conversation_history.clone()),
                lang: token.clone(),
                department: context.department.clone(),
                topic: context.topic.clone(),
                topic_url: context.topic_url.clone(),
                department_url: context.department_url.clone(),
                search_results: context.search_results.clone(),
                system_prompt: context.system_prompt.clone(),
                similar_questions: context.similar_questions.clone(),
                referring_url: state.referring_url.clone(),
                original_message: Some(state.safe_message().to_string()),
            })
            .await
            .map_err(|e| WorkflowError::node("answer", e))?;

        let record = parse_response(&generated.content);
        let answer = Answer {
            record,
            metadata: GenerationMetadata {
                model: generated.model,
                input_tokens: generated.input_tokens,
                output_tokens: generated.output_tokens,
                tools: generated.tools,
            },
            question_language: context.original_lang.clone(),
            english_question: Some(state.translated_question().to_string()),
            history_signature: generated.history_signature,
        };

        Ok(StateUpdate {
            answer: Some(answer),
            status: Some(WorkflowStatus::VerifyingCitation),
            ..Default::default()
        })
    }

    /// Citation verification plus assembly of the caller-visible result.
    /// Runs on both branches; the short-circuit payload is already vetted
    /// and skips the live check.
    async fn verify(&self, state: &WorkflowState) -> Result<StateUpdate, WorkflowError> {
        let answer = state.answer.as_ref().ok_or_else(|| {
            WorkflowError::node("verify", DomainError::internal("no answer generated"))
        })?;
        let context = state.context.clone().unwrap_or_default();

        let final_citation_url = if state.short_circuit_payload.is_some() {
            state.final_citation_url.clone()
        } else {
            self.resolve_citation(state, answer).await
        };

        let result = WorkflowResult {
            answer: answer.clone(),
            context,
            question: state.safe_message().to_string(),
            citation_url: final_citation_url.clone(),
            history_signature: answer.history_signature.clone(),
        };

        Ok(StateUpdate {
            final_citation_url,
            result: Some(result),
            status: Some(WorkflowStatus::VerifyingCitation),
            ..Default::default()
        })
    }

    async fn resolve_citation(&self, state: &WorkflowState, answer: &Answer) -> Option<String> {
        // Only normal answers carry a citation the caller may see; clarifying
        // questions and out-of-scope replies get none even when the model
        // emitted a URL tag.
        if answer.record.answer_type != AnswerType::Normal {
            return None;
        }
        let url = answer.record.citation_url.clone()?;

        if answer.verified_urls().contains(&url) {
            return Some(url);
        }
        if !is_canonical_url(&url) {
            return Some(url);
        }

        // Verification errors downgrade to a missing citation rather than
        // aborting a run that already has an answer.
        match self.deps.url_validator.validate_url(&url, &state.chat_id).await {
            Ok(check) if check.is_valid => Some(check.url.unwrap_or(url)),
            Ok(_) => self.citation_fallback(state).await,
            Err(e) => {
                self.deps.logger.error(
                    &state.chat_id,
                    "citation check failed",
                    json!({ "error": e.to_string() }),
                );
                None
            }
        }
    }

    async fn citation_fallback(&self, state: &WorkflowState) -> Option<String> {
        let department = state
            .context
            .as_ref()
            .and_then(|c| c.department.as_deref());
        match self
            .deps
            .url_validator
            .search_fallback(
                &state.lang,
                state.translated_question(),
                department,
                state.translation_f.as_deref(),
                &state.chat_id,
            )
            .await
        {
            Ok(Some(fallback)) => Some(fallback),
            // A canonical URL that failed its live check is never served.
            Ok(None) => None,
            Err(e) => {
                self.deps.logger.error(
                    &state.chat_id,
                    "search fallback failed",
                    json!({ "error": e.to_string() }),
                );
                None
            }
        }
    }

    /// Terminal node. The short-circuit branch already persisted; on the
    /// normal branch a persistence failure propagates to the caller.
    async fn persist(
        &self,
        state: &WorkflowState,
        ctx: &RequestContext,
    ) -> Result<StateUpdate, WorkflowError> {
        let answer = state.answer.as_ref().ok_or_else(|| {
            WorkflowError::node("persist", DomainError::internal("no answer generated"))
        })?;

        let response_time = state
            .start_time
            .map(|start| Utc::now().timestamp_millis() - start)
            .unwrap_or_default();

        if state.short_circuit_payload.is_none() {
            let record = InteractionRecord {
                chat_id: state.chat_id.clone(),
                selected_ai: state.selected_ai.clone(),
                question: state.safe_message().to_string(),
                user_message_id: Some(state.user_message_id.clone()),
                referring_url: state.referring_url.clone(),
                answer: Some(answer.clone()),
                final_citation_url: state.final_citation_url.clone(),
                context: state.context.clone(),
                workflow: state.variant.wire_name().to_string(),
                page_language: state.lang.clone(),
                response_time,
                search_provider: state.search_provider.clone(),
                instant_answer_chat_id: None,
                instant_answer_interaction_id: None,
            };
            self.deps
                .persistence
                .persist_interaction(&record, ctx.user.as_ref())
                .await
                .map_err(|e| WorkflowError::node("persist", e))?;
        }

        let status = if answer.record.answer_type.is_question() {
            WorkflowStatus::NeedClarification
        } else {
            WorkflowStatus::Complete
        };

        self.deps.logger.info(
            &state.chat_id,
            "workflow complete",
            json!({ "status": status, "responseTime": response_time }),
        );

        Ok(StateUpdate::status(status))
    }
}

/// Canonical-domain citations get a live check when not already verified
/// during generation; everything else passes through unchecked.
fn is_canonical_url(url: &str) -> bool {
    url.starts_with("https://www.canada.ca") || url.starts_with("http://www.canada.ca")
}

/// 3-letter output-language token for the generation prompt.
fn output_lang_token(output_lang: Option<&str>) -> String {
    match output_lang.map(str::to_lowercase).as_deref() {
        Some("fr") | Some("fra") => "fra".to_string(),
        Some("en") | Some("eng") | None => "eng".to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_url_is_prefix_matched() {
        assert!(is_canonical_url("https://www.canada.ca/en/services.html"));
        assert!(is_canonical_url("http://www.canada.ca/fr/services.html"));
        assert!(!is_canonical_url("https://www.ontario.ca/page/id"));
        assert!(!is_canonical_url("https://example.com/?u=www.canada.ca"));
    }

    #[test]
    fn test_output_lang_token_normalization() {
        assert_eq!(output_lang_token(Some("fr")), "fra");
        assert_eq!(output_lang_token(Some("FRA")), "fra");
        assert_eq!(output_lang_token(Some("en")), "eng");
        assert_eq!(output_lang_token(Some("eng")), "eng");
        assert_eq!(output_lang_token(Some("SPA")), "spa");
        assert_eq!(output_lang_token(None), "eng");
    }
}
