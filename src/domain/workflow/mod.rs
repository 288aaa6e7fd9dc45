//! Workflow state machine: per-run state, status, errors and variant
//! definitions

mod error;
mod state;
mod variant;

pub use error::{RedactionError, ShortQueryValidation, WorkflowError};
pub use state::{ShortCircuitPayload, StateUpdate, WorkflowResult, WorkflowState, WorkflowStatus};
pub use variant::{NodeKind, WorkflowVariant};
