//! Check ledger domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use checkrun_shared::{CheckRunId, Ssn};

/// An approved, tax-computed disbursement awaiting a check.
///
/// Owned by the wider application; read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// Distribution id.
    pub id: i64,
    /// Member SSN.
    pub ssn: Ssn,
    /// Gross amount before withholding.
    pub gross_amount: Decimal,
    /// Federal tax withheld.
    pub federal_tax_amount: Decimal,
    /// State tax withheld.
    pub state_tax_amount: Decimal,
    /// Employee name on the distribution.
    pub employee_name: Option<String>,
    /// Name of the designated payee, when one exists.
    pub payee_name: Option<String>,
    /// Tax code.
    pub tax_code_id: String,
}

/// Identity master record.
///
/// Several records may share an SSN (rehire or merge history).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demographic {
    /// Demographic id.
    pub id: i64,
    /// SSN.
    pub ssn: Ssn,
    /// Badge number.
    pub badge_number: i32,
    /// Identifier in the external HR system.
    pub external_id: Option<i64>,
    /// Creation timestamp.
    pub created_at_utc: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at_utc: Option<DateTime<Utc>>,
}

impl Demographic {
    /// Modification time when known, creation time otherwise.
    #[must_use]
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.modified_at_utc.unwrap_or(self.created_at_utc)
    }
}

/// One issued check. Append-only: only the void fields ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitShareCheck {
    /// Allocator-issued check number; never reused.
    pub check_number: i64,
    /// Owning run.
    pub check_run_workflow_id: CheckRunId,
    /// Payee SSN.
    pub ssn: Ssn,
    /// Resolved identity record.
    pub demographic_id: i64,
    /// Name printed on the check.
    pub payable_name: String,
    /// Net amount.
    pub check_amount: Decimal,
    /// Tax code carried from the distribution.
    pub tax_code_id: String,
    /// Date printed on the check.
    pub check_date: NaiveDate,
    /// Date of the run that issued it.
    pub check_run_date: NaiveDate,
    /// Whether a reprint superseded this check.
    pub is_voided: bool,
    /// Date it was voided.
    pub void_date: Option<NaiveDate>,
    /// Reference id handed to the bank.
    pub bank_reference_id: i64,
}

/// Minimal projection of a check handed to the formatters. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckLineItem {
    /// Check number.
    pub check_number: i64,
    /// Net amount.
    pub amount: Decimal,
    /// Payable name.
    pub recipient_name: String,
    /// SSN as nine zero-padded digits.
    pub ssn: String,
    /// Badge number of the resolved identity.
    pub badge_number: i32,
    /// Issue date.
    pub issue_date: NaiveDate,
}
