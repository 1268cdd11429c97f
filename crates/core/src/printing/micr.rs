//! MICR line formatting.
//!
//! The MICR line sits at the bottom of a printed check and is read
//! magnetically by the bank. Fonts for the E-13B character set map the
//! special symbols to ASCII letters: `A` transit, `B` amount, `C` on-us.

use rust_decimal::{Decimal, RoundingStrategy};

const TRANSIT: char = 'A';
const AMOUNT: char = 'B';
const ON_US: char = 'C';

/// Produces the MICR line for one check.
pub trait MicrFormatter: Send + Sync {
    /// Formats the line for `check_number` and `amount`.
    ///
    /// Must be a pure function of its inputs.
    fn format_line(&self, check_number: i64, amount: Decimal) -> String;
}

/// E-13B layout bound to one bank routing number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E13bMicrFormatter {
    routing_number: String,
}

impl E13bMicrFormatter {
    /// Creates a formatter for `routing_number`.
    #[must_use]
    pub fn new(routing_number: impl Into<String>) -> Self {
        Self {
            routing_number: routing_number.into(),
        }
    }

    /// Routing number printed in the transit field.
    #[must_use]
    pub fn routing_number(&self) -> &str {
        &self.routing_number
    }
}

/// Whole cents of `amount`, as a digit string without sign.
fn cents(amount: Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    (rounded * Decimal::ONE_HUNDRED).trunc().to_string()
}

impl MicrFormatter for E13bMicrFormatter {
    fn format_line(&self, check_number: i64, amount: Decimal) -> String {
        format!(
            "{ON_US}{check_number:0>10}{ON_US} {TRANSIT}{routing}{TRANSIT} {AMOUNT}{cents:0>10}{AMOUNT}",
            routing = self.routing_number,
            cents = cents(amount),
        )
    }
}
