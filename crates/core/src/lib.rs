//! Core business logic for the profit-sharing check run.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the collaborator traits in [`ports`].
//!
//! # Modules
//!
//! - `checks` - Check number allocation, identity resolution and batch generation
//! - `workflow` - Check run state machine and reprint policy
//! - `printing` - MICR, DJDE and standard print rendering
//! - `ports` - Collaborator traits implemented by `checkrun-db`
//! - `memory` - In-memory collaborator implementations
//! - `clock` - Time source

pub mod checks;
pub mod clock;
pub mod error;
pub mod memory;
pub mod ports;
pub mod printing;
pub mod workflow;

pub use checks::{
    CheckBatchGenerator, CheckNumberAllocator, CheckPrintRequest, CheckPrintResult,
    CheckRunCollaborators, CheckRunPolicy, DemographicResolver, PrinterType,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CheckRunError, FailureKind, ValidationErrors};
pub use memory::InMemoryCheckRunStore;
pub use workflow::{CheckRunWorkflow, RunWorkflowManager, StepStatus, WorkflowMutation};
