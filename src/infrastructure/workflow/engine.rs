//! Workflow engine
//!
//! Walks a variant's node sequence over one request-scoped state. The only
//! branch point sits after the short-circuit node: a synthesized payload
//! jumps the run straight to verification.

use serde_json::json;

use crate::domain::workflow::{NodeKind, WorkflowError, WorkflowState};

use super::nodes::NodeLibrary;
use super::request_context::RequestContext;

pub struct WorkflowEngine {
    nodes: NodeLibrary,
}

impl WorkflowEngine {
    pub fn new(nodes: NodeLibrary) -> Self {
        Self { nodes }
    }

    /// Run one request through its variant's sequence. Any node failure
    /// aborts the run; no partial result is synthesized here.
    pub async fn run(
        &self,
        mut state: WorkflowState,
        ctx: &RequestContext,
    ) -> Result<WorkflowState, WorkflowError> {
        let sequence = state.variant.sequence();
        self.nodes.logger().info(
            &state.chat_id,
            "workflow started",
            json!({
                "workflow": state.variant.wire_name(),
                "headers": ctx.sanitized_headers(),
            }),
        );

        let mut idx = 0;
        while idx < sequence.len() {
            let kind = sequence[idx];
            let update = self.nodes.execute(kind, &state, ctx).await?;
            state.apply(update);

            if kind == NodeKind::ShortCircuit && state.short_circuit_payload.is_some() {
                if let Some(verify) = sequence.iter().position(|n| *n == NodeKind::Verify) {
                    idx = verify;
                    continue;
                }
            }
            idx += 1;
        }

        Ok(state)
    }
}
