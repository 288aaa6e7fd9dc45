//! Infrastructure layer - the workflow engine and observability setup

pub mod observability;
pub mod workflow;
