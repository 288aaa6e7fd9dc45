//! Workflow variants and node ordering
//!
//! The three variants share one node library and differ only in
//! composition. The graph is a straight line with a single fork after the
//! short-circuit node, which rejoins at verification.

use serde::{Deserialize, Serialize};

/// Named entries of the node library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Init,
    Validate,
    Redact,
    Translate,
    ShortCircuit,
    Context,
    SimilarQuestions,
    Answer,
    Verify,
    Persist,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Validate => "validate",
            Self::Redact => "redact",
            Self::Translate => "translate",
            Self::ShortCircuit => "shortCircuit",
            Self::Context => "context",
            Self::SimilarQuestions => "similarQuestions",
            Self::Answer => "answer",
            Self::Verify => "verify",
            Self::Persist => "persist",
        }
    }
}

const DEFAULT_SEQUENCE: &[NodeKind] = &[
    NodeKind::Init,
    NodeKind::Validate,
    NodeKind::Redact,
    NodeKind::Translate,
    NodeKind::Context,
    NodeKind::Answer,
    NodeKind::Verify,
    NodeKind::Persist,
];

const VECTOR_SEQUENCE: &[NodeKind] = &[
    NodeKind::Init,
    NodeKind::Validate,
    NodeKind::Redact,
    NodeKind::Translate,
    NodeKind::ShortCircuit,
    NodeKind::Context,
    NodeKind::Answer,
    NodeKind::Verify,
    NodeKind::Persist,
];

const INSTANT_QA_SEQUENCE: &[NodeKind] = &[
    NodeKind::Init,
    NodeKind::Validate,
    NodeKind::Redact,
    NodeKind::Translate,
    NodeKind::ShortCircuit,
    NodeKind::Context,
    NodeKind::SimilarQuestions,
    NodeKind::Answer,
    NodeKind::Verify,
    NodeKind::Persist,
];

/// The three pipeline compositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowVariant {
    /// Always derives fresh context and generates an answer.
    Default,

    /// Adds similar-answer short-circuiting and context reuse.
    DefaultWithVector,

    /// Adds short-circuiting plus similar-Q&A prompt enrichment.
    InstantAndQa,
}

impl WorkflowVariant {
    /// Name recorded on persisted interactions.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Default => "DefaultGraph",
            Self::DefaultWithVector => "DefaultWithVectorGraph",
            Self::InstantAndQa => "InstantAndQAGraph",
        }
    }

    pub fn sequence(&self) -> &'static [NodeKind] {
        match self {
            Self::Default => DEFAULT_SEQUENCE,
            Self::DefaultWithVector => VECTOR_SEQUENCE,
            Self::InstantAndQa => INSTANT_QA_SEQUENCE,
        }
    }

    /// Whether context reuse from the last AI turn applies (vector-backed
    /// variants only).
    pub fn reuses_context(&self) -> bool {
        matches!(self, Self::DefaultWithVector | Self::InstantAndQa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_start_with_moderation_stages() {
        for variant in [
            WorkflowVariant::Default,
            WorkflowVariant::DefaultWithVector,
            WorkflowVariant::InstantAndQa,
        ] {
            let seq = variant.sequence();
            assert_eq!(
                &seq[..4],
                &[
                    NodeKind::Init,
                    NodeKind::Validate,
                    NodeKind::Redact,
                    NodeKind::Translate,
                ]
            );
            assert_eq!(seq[seq.len() - 2], NodeKind::Verify);
            assert_eq!(seq[seq.len() - 1], NodeKind::Persist);
        }
    }

    #[test]
    fn test_default_variant_has_no_short_circuit() {
        assert!(!WorkflowVariant::Default
            .sequence()
            .contains(&NodeKind::ShortCircuit));
        assert!(!WorkflowVariant::Default.reuses_context());
    }

    #[test]
    fn test_instant_qa_enriches_between_context_and_answer() {
        let seq = WorkflowVariant::InstantAndQa.sequence();
        let context = seq.iter().position(|n| *n == NodeKind::Context).unwrap();
        assert_eq!(seq[context + 1], NodeKind::SimilarQuestions);
        assert_eq!(seq[context + 2], NodeKind::Answer);
    }
}
