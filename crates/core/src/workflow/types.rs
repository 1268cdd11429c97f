//! Workflow domain types for check run lifecycle management.
//!
//! This module defines the check run workflow record, its step status, and
//! the mutations that may be applied to it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use checkrun_shared::CheckRunId;

use crate::error::CheckRunError;

/// Validation field for reprint eligibility.
pub const IS_REPRINT_FIELD: &str = "IsReprint";

/// Failure returned when a run is past its reprint limit or not from today.
#[must_use]
pub fn reprint_not_allowed() -> CheckRunError {
    CheckRunError::validation(
        IS_REPRINT_FIELD,
        "This check run cannot be reprinted (limit reached or not same-day).",
    )
}

/// Status of the current step of a check run.
///
/// The only valid transition is Pending → Completed. A run is "active"
/// while its current step is not Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step is in progress.
    Pending,
    /// Step has finished.
    Completed,
}

impl StepStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns true if a run in this status counts as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Completed)
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!((self, to), (Self::Pending, Self::Completed))
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One check run in progress for a profit year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRunWorkflow {
    /// Run identifier.
    pub id: CheckRunId,
    /// Profit year the run belongs to.
    pub profit_year: i32,
    /// Date the checks were run.
    pub check_run_date: NaiveDate,
    /// Current step number (starts at 1).
    pub step_number: i32,
    /// Status of the current step.
    pub step_status: StepStatus,
    /// Starting check number of the most recent print.
    pub check_number: i64,
    /// Number of reprints performed so far.
    pub reprint_count: i32,
    /// Reprint limit fixed by policy when the run was started.
    pub max_reprint_count: i32,
    /// Who started the run.
    pub created_by: String,
    /// When the run was started.
    pub created_at: DateTime<Utc>,
    /// Who last modified the run.
    pub modified_by: Option<String>,
    /// When the run was last modified.
    pub modified_at: Option<DateTime<Utc>>,
}

/// Input for starting a new run.
#[derive(Debug, Clone)]
pub struct NewCheckRun {
    /// Profit year.
    pub profit_year: i32,
    /// Date the checks are run.
    pub check_run_date: NaiveDate,
    /// First allocated check number.
    pub check_number: i64,
    /// Reprint limit.
    pub max_reprint_count: i32,
    /// User starting the run.
    pub created_by: String,
}

/// A change to an existing run, applied atomically by the workflow store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowMutation {
    /// Mark the current step completed and advance the step number.
    CompleteStep {
        /// Step the caller believes it is completing (recorded in logs only).
        step_number: i32,
        /// User completing the step.
        user: String,
    },
    /// Count one more reprint.
    IncrementReprintCount {
        /// User requesting the reprint.
        user: String,
    },
    /// Count one more reprint only if the run may still be reprinted on
    /// `today`. The check and the increment happen in the same `apply`.
    ConsumeReprint {
        /// Date the reprint is requested on.
        today: NaiveDate,
        /// User requesting the reprint.
        user: String,
    },
    /// Record the starting check number of a reprint.
    RestartCheckNumber {
        /// New starting check number.
        check_number: i64,
        /// User requesting the reprint.
        user: String,
    },
}

impl WorkflowMutation {
    /// Returns the user responsible for the mutation.
    #[must_use]
    pub fn user(&self) -> &str {
        match self {
            Self::CompleteStep { user, .. }
            | Self::IncrementReprintCount { user }
            | Self::ConsumeReprint { user, .. }
            | Self::RestartCheckNumber { user, .. } => user,
        }
    }
}

impl CheckRunWorkflow {
    /// Creates a run at step 1, pending, with no reprints.
    #[must_use]
    pub fn start(input: NewCheckRun, now: DateTime<Utc>) -> Self {
        Self {
            id: CheckRunId::new(),
            profit_year: input.profit_year,
            check_run_date: input.check_run_date,
            step_number: 1,
            step_status: StepStatus::Pending,
            check_number: input.check_number,
            reprint_count: 0,
            max_reprint_count: input.max_reprint_count,
            created_by: input.created_by,
            created_at: now,
            modified_by: None,
            modified_at: None,
        }
    }

    /// Returns true while the current step is not completed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.step_status.is_active()
    }

    /// Same-day-only, bounded reprint policy.
    #[must_use]
    pub fn can_reprint(&self, today: NaiveDate) -> bool {
        self.reprint_count < self.max_reprint_count && self.check_run_date == today
    }

    /// Applies a mutation and stamps the audit fields.
    ///
    /// Step completion always sets the status to Completed and advances the
    /// step number, whatever the current status is.
    ///
    /// # Errors
    ///
    /// Returns the `IsReprint` validation failure when a
    /// [`WorkflowMutation::ConsumeReprint`] finds the run no longer
    /// reprintable. The run is left untouched in that case.
    pub fn apply(
        &mut self,
        mutation: &WorkflowMutation,
        now: DateTime<Utc>,
    ) -> Result<(), CheckRunError> {
        match mutation {
            WorkflowMutation::CompleteStep { .. } => {
                self.step_status = StepStatus::Completed;
                self.step_number += 1;
            }
            WorkflowMutation::IncrementReprintCount { .. } => {
                self.reprint_count += 1;
            }
            WorkflowMutation::ConsumeReprint { today, .. } => {
                if !self.can_reprint(*today) {
                    return Err(reprint_not_allowed());
                }
                self.reprint_count += 1;
            }
            WorkflowMutation::RestartCheckNumber { check_number, .. } => {
                self.check_number = *check_number;
            }
        }
        self.modified_by = Some(mutation.user().to_string());
        self.modified_at = Some(now);
        Ok(())
    }
}
