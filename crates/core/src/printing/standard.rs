//! Human-readable check blocks for standard printers.

use rust_decimal::{Decimal, RoundingStrategy};

use super::micr::MicrFormatter;
use crate::checks::types::CheckLineItem;

/// Renders `amount` with two decimals and comma thousands separators.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

/// Masks a nine-digit SSN string, keeping the last four digits.
#[must_use]
pub fn mask_ssn_digits(digits: &str) -> String {
    let start = digits.len().saturating_sub(4);
    format!("xxx-xx-{}", digits.get(start..).unwrap_or_default())
}

/// One block per check: the printed fields, a blank line, then the MICR line.
#[must_use]
pub fn render_block(item: &CheckLineItem, micr: &dyn MicrFormatter) -> String {
    [
        format!("Check #{}", item.check_number),
        format!("Date: {}", item.issue_date.format("%m/%d/%Y")),
        format!("Pay to: {}", item.recipient_name),
        format!("Amount: ${}", format_amount(item.amount)),
        format!("Badge: {}", item.badge_number),
        format!("SSN: {}", mask_ssn_digits(&item.ssn)),
        String::new(),
        micr.format_line(item.check_number, item.amount),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printing::micr::E13bMicrFormatter;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), "0.00")]
    #[case(dec!(5.5), "5.50")]
    #[case(dec!(999.99), "999.99")]
    #[case(dec!(1000), "1,000.00")]
    #[case(dec!(1234567.891), "1,234,567.89")]
    #[case(dec!(100000), "100,000.00")]
    #[case(dec!(-2500.10), "-2,500.10")]
    fn test_format_amount(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_amount(amount), expected);
    }

    #[rstest]
    #[case("123456789", "xxx-xx-6789")]
    #[case("000001234", "xxx-xx-1234")]
    fn test_mask_ssn_digits(#[case] digits: &str, #[case] expected: &str) {
        assert_eq!(mask_ssn_digits(digits), expected);
    }

    #[test]
    fn test_render_block() {
        let item = CheckLineItem {
            check_number: 1001,
            amount: dec!(1234.5),
            recipient_name: "Jane Doe".to_string(),
            ssn: "123456789".to_string(),
            badge_number: 700_123,
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        };
        let block = render_block(&item, &E13bMicrFormatter::new("026004297"));

        assert_eq!(
            block,
            "Check #1001\n\
             Date: 03/07/2025\n\
             Pay to: Jane Doe\n\
             Amount: $1,234.50\n\
             Badge: 700123\n\
             SSN: xxx-xx-6789\n\
             \n\
             C0000001001C A026004297A B0000123450B"
        );
        assert!(!block.contains("123456789"));
    }
}
