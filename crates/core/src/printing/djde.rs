//! Xerox DJDE directive output.
//!
//! A DJDE (Dynamic Job Descriptor Entry) record tells a Xerox production
//! printer which form and job descriptor to apply to the data that follows.

use super::standard::{format_amount, mask_ssn_digits};
use crate::checks::types::CheckLineItem;

/// Builds the directive text for one check.
pub trait DjdeTemplate: Send + Sync {
    /// Directives for `item`. Must be a pure function of its input.
    fn generate_directives(&self, item: &CheckLineItem) -> String;
}

/// Profit-sharing check stock template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitShareCheckTemplate {
    job_descriptor: String,
    form: String,
}

impl Default for ProfitShareCheckTemplate {
    fn default() -> Self {
        Self {
            job_descriptor: "PSCHK".to_string(),
            form: "PSCHKF".to_string(),
        }
    }
}

impl ProfitShareCheckTemplate {
    /// Creates a template for a specific job descriptor and form.
    #[must_use]
    pub fn new(job_descriptor: impl Into<String>, form: impl Into<String>) -> Self {
        Self {
            job_descriptor: job_descriptor.into(),
            form: form.into(),
        }
    }
}

impl DjdeTemplate for ProfitShareCheckTemplate {
    fn generate_directives(&self, item: &CheckLineItem) -> String {
        [
            format!(
                "$DJDE$ JDE={},FORMS={},END;",
                self.job_descriptor, self.form
            ),
            format!("CHECKNO={:0>10}", item.check_number),
            format!("DATE={}", item.issue_date.format("%m/%d/%Y")),
            format!("PAYEE={}", item.recipient_name),
            format!("AMOUNT={}", format_amount(item.amount)),
            format!("BADGE={}", item.badge_number),
            format!("SSN={}", mask_ssn_digits(&item.ssn)),
        ]
        .join("\n")
    }
}
