//! Payable name and check amount rules.
//!
//! Both rules must reproduce identically on rerun, so they are pure
//! functions of the distribution and the policy.

use rust_decimal::{Decimal, RoundingStrategy};

use super::policy::CheckRunPolicy;
use super::types::Distribution;

/// A payable name plus what had to be done to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayableName {
    /// The name to print.
    pub value: String,
    /// True when no usable name existed and the placeholder was used.
    pub defaulted: bool,
    /// Original length in characters when the name was truncated.
    pub truncated_from: Option<usize>,
}

/// Picks the payee name, else the employee name, else the placeholder;
/// trims it and cuts it to the field width.
#[must_use]
pub fn payable_name(distribution: &Distribution, policy: &CheckRunPolicy) -> PayableName {
    let candidate = distribution
        .payee_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .or(distribution.employee_name.as_deref())
        .unwrap_or_default()
        .trim();

    let (mut value, defaulted) = if candidate.is_empty() {
        (policy.default_payable_name.clone(), true)
    } else {
        (candidate.to_string(), false)
    };

    let length = value.chars().count();
    let truncated_from = if length > policy.max_payable_name_length {
        value = value.chars().take(policy.max_payable_name_length).collect();
        Some(length)
    } else {
        None
    };

    PayableName {
        value,
        defaulted,
        truncated_from,
    }
}

/// Net check amount: gross less federal and state tax, rounded to cents
/// with midpoints away from zero.
#[must_use]
pub fn check_amount(distribution: &Distribution) -> Decimal {
    (distribution.gross_amount - distribution.federal_tax_amount - distribution.state_tax_amount)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkrun_shared::Ssn;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn distribution(payee: Option<&str>, employee: Option<&str>) -> Distribution {
        Distribution {
            id: 1,
            ssn: Ssn::new(123_456_789).unwrap(),
            gross_amount: dec!(100.00),
            federal_tax_amount: dec!(0),
            state_tax_amount: dec!(0),
            employee_name: employee.map(String::from),
            payee_name: payee.map(String::from),
            tax_code_id: "7".to_string(),
        }
    }

    #[rstest]
    #[case(Some("Jane Payee"), Some("John Employee"), "Jane Payee")]
    #[case(None, Some("John Employee"), "John Employee")]
    #[case(Some("   "), Some("John Employee"), "John Employee")]
    #[case(Some("  Padded Name  "), None, "Padded Name")]
    #[case(None, Some("  Trim Me "), "Trim Me")]
    fn test_payable_name_precedence(
        #[case] payee: Option<&str>,
        #[case] employee: Option<&str>,
        #[case] expected: &str,
    ) {
        let name = payable_name(&distribution(payee, employee), &CheckRunPolicy::default());
        assert_eq!(name.value, expected);
        assert!(!name.defaulted);
        assert_eq!(name.truncated_from, None);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), Some("   "))]
    #[case(Some("\t"), None)]
    fn test_blank_name_defaults_to_payee(
        #[case] payee: Option<&str>,
        #[case] employee: Option<&str>,
    ) {
        let name = payable_name(&distribution(payee, employee), &CheckRunPolicy::default());
        assert_eq!(name.value, "PAYEE");
        assert!(name.defaulted);
    }

    #[test]
    fn test_long_name_truncated_to_84() {
        let long = "A".repeat(100);
        let name = payable_name(&distribution(Some(&long), None), &CheckRunPolicy::default());
        assert_eq!(name.value.chars().count(), 84);
        assert_eq!(name.truncated_from, Some(100));
    }

    #[test]
    fn test_exactly_84_not_truncated() {
        let exact = "B".repeat(84);
        let name = payable_name(&distribution(Some(&exact), None), &CheckRunPolicy::default());
        assert_eq!(name.value, exact);
        assert_eq!(name.truncated_from, None);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let accented = "É".repeat(90);
        let name = payable_name(&distribution(Some(&accented), None), &CheckRunPolicy::default());
        assert_eq!(name.value.chars().count(), 84);
    }

    #[rstest]
    #[case(dec!(100.005), dec!(0), dec!(0), dec!(100.01))]
    #[case(dec!(100.004), dec!(0), dec!(0), dec!(100.00))]
    #[case(dec!(1000.00), dec!(200.00), dec!(50.00), dec!(750.00))]
    #[case(dec!(500.125), dec!(100.00), dec!(0), dec!(400.13))]
    #[case(dec!(10.00), dec!(10.005), dec!(0), dec!(-0.01))]
    fn test_check_amount_rounding(
        #[case] gross: Decimal,
        #[case] federal: Decimal,
        #[case] state: Decimal,
        #[case] expected: Decimal,
    ) {
        let mut d = distribution(None, Some("X"));
        d.gross_amount = gross;
        d.federal_tax_amount = federal;
        d.state_tax_amount = state;
        assert_eq!(check_amount(&d), expected);
    }
}
