//! Collaborator contracts
//!
//! Everything the pipeline depends on but does not implement: moderation
//! checks, translation, retrieval, similarity lookup, answer generation,
//! citation validation and persistence. Concrete backends live outside this
//! crate and are injected as `Arc<dyn Trait>`.

mod events;
mod generation;
mod moderation;
mod persistence;
mod retrieval;
mod similarity;
mod translation;
mod verification;

pub use events::{EventLevel, EventSink, GraphEvent};
pub use generation::{AnswerGenerator, GeneratedText, GenerationRequest};
pub use moderation::{PiiCheck, PiiDetector, ShortQueryValidator};
pub use persistence::{InteractionRecord, PersistenceSink, UserIdentity};
pub use retrieval::{
    ContextRequest, ContextSummarizer, ContextSummary, ScenarioOverride, ScenarioOverrideLookup,
    SearchOutcome, SearchProvider, SearchRequest,
};
pub use similarity::{
    SimilarAnswerMatch, SimilarAnswerRequest, SimilarQuestionsOptions, SimilarQuestionsProvider,
    SimilarityMatcher, SourceCitation,
};
pub use translation::{TranslationOutcome, TranslationProvider};
pub use verification::{UrlCheck, UrlValidator};
