//! Check run workflow management.
//!
//! This module implements the check run lifecycle state machine and the
//! reprint policy.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (StepStatus, CheckRunWorkflow, WorkflowMutation)
//! - `service` - Run workflow manager

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::RunWorkflowManager;
pub use types::{
    CheckRunWorkflow, IS_REPRINT_FIELD, NewCheckRun, StepStatus, WorkflowMutation,
    reprint_not_allowed,
};
