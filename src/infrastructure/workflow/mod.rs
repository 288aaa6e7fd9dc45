//! Workflow engine, node library and request-scoped plumbing

mod engine;
mod event_log;
mod nodes;
mod request_context;

#[cfg(test)]
pub mod mocks;

pub use engine::WorkflowEngine;
pub use event_log::EventLogger;
pub use nodes::{NodeLibrary, NodeLibraryDeps};
pub use request_context::RequestContext;

pub use crate::domain::traits::UserIdentity;
