//! Property-based tests for check issuance.
//!
//! - Check count equals the number of distinct positive requested ids
//! - Check numbers increase with distribution id
//! - Identity selection ignores candidate order
//! - Net amounts always land on whole cents

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use checkrun_shared::Ssn;

use super::demographic::select_current;
use super::generator::{CheckBatchGenerator, CheckRunCollaborators};
use super::payee::check_amount;
use super::policy::CheckRunPolicy;
use super::request::{CheckPrintRequest, PrinterType};
use super::types::{Demographic, Distribution};
use crate::clock::FixedClock;
use crate::memory::InMemoryCheckRunStore;

fn run_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 15).unwrap()
}

/// Strategy for amounts with up to three decimals (0.000 to 100,000.000).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|mills| Decimal::new(mills, 3))
}

/// Strategy for requested id lists with duplicates and non-positive noise.
fn arb_requested_ids() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-3i64..40, 1..30)
}

fn arb_demographic() -> impl Strategy<Value = Demographic> {
    (
        1i64..50,
        prop::option::of(1i64..5),
        0i64..1_000,
        prop::option::of(0i64..1_000),
    )
        .prop_map(|(id, external_id, created, modified)| Demographic {
            id,
            ssn: Ssn::new(123_456_789).unwrap(),
            badge_number: 1,
            external_id,
            created_at_utc: Utc.timestamp_opt(1_700_000_000 + created, 0).unwrap(),
            modified_at_utc: modified.map(|m| Utc.timestamp_opt(1_700_000_000 + m, 0).unwrap()),
        })
}

fn distribution(id: i64) -> Distribution {
    Distribution {
        id,
        ssn: Ssn::new(200_000_000 + i32::try_from(id).unwrap()).unwrap(),
        gross_amount: Decimal::new(id * 1_001, 2),
        federal_tax_amount: Decimal::ZERO,
        state_tax_amount: Decimal::ZERO,
        employee_name: Some(format!("Employee {id}")),
        payee_name: None,
        tax_code_id: "7".to_string(),
    }
}

async fn seeded_generator() -> (Arc<InMemoryCheckRunStore>, CheckBatchGenerator) {
    let store = Arc::new(InMemoryCheckRunStore::with_first_check_number(5_000));
    for id in 1..40 {
        let d = distribution(id);
        store
            .insert_demographic(Demographic {
                id,
                ssn: d.ssn,
                badge_number: i32::try_from(id).unwrap(),
                external_id: Some(id),
                created_at_utc: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                modified_at_utc: None,
            })
            .await;
        store.insert_distribution(d).await;
    }
    let generator = CheckBatchGenerator::new(
        CheckRunCollaborators::from_store(store.clone(), Arc::new(FixedClock::new(run_day()))),
        CheckRunPolicy::default(),
    );
    (store, generator)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Net amount is always rounded to exactly two decimal places.
    #[test]
    fn prop_check_amount_is_whole_cents(
        gross in arb_amount(),
        federal in arb_amount(),
        state in arb_amount(),
    ) {
        let mut d = distribution(1);
        d.gross_amount = gross;
        d.federal_tax_amount = federal;
        d.state_tax_amount = state;

        let amount = check_amount(&d);
        prop_assert_eq!(amount, amount.round_dp(2));
        let exact = gross - federal - state;
        prop_assert!((amount - exact).abs() <= Decimal::new(5, 3));
    }

    /// The selected identity does not depend on candidate order.
    #[test]
    fn prop_selection_is_order_independent(
        candidates in prop::collection::vec(arb_demographic(), 1..8),
        rotation in 0usize..8,
    ) {
        let mut shuffled = candidates.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left(rotation % len);

        let a = select_current(&candidates).map(|d| d.id);
        let b = select_current(&shuffled).map(|d| d.id);
        prop_assert_eq!(a, b);
    }

    /// One check per distinct positive id, numbered in id order.
    #[test]
    fn prop_generation_counts_and_orders_checks(ids in arb_requested_ids()) {
        let mut expected: Vec<i64> = ids.iter().copied().filter(|id| *id > 0).collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assume!(!expected.is_empty());

        runtime().block_on(async {
            let (store, generator) = seeded_generator().await;
            let request = CheckPrintRequest {
                distribution_ids: ids.clone(),
                profit_year: 2025,
                check_run_date: run_day(),
                user_name: "prop".to_string(),
                is_reprint: false,
                printer_type: PrinterType::Standard,
            };

            let result = generator.generate(&request, &CancellationToken::new()).await;
            prop_assert!(result.is_ok());
            let result = result.unwrap();
            prop_assert_eq!(result.check_count, expected.len());

            let checks = store.checks().await;
            let numbers: Vec<i64> = checks.iter().map(|c| c.check_number).collect();
            prop_assert!(numbers.windows(2).all(|w| w[0] < w[1]));

            let ssns: Vec<Ssn> = checks.iter().map(|c| c.ssn).collect();
            let expected_ssns: Vec<Ssn> = expected.iter().map(|id| distribution(*id).ssn).collect();
            prop_assert_eq!(ssns, expected_ssns);
            Ok(())
        })?;
    }

    /// Reprint stays allowed exactly while the count is under the limit and
    /// the run date is today.
    #[test]
    fn prop_reprint_policy(
        reprint_count in 0i32..5,
        max_reprint_count in 0i32..5,
        day_offset in -2i64..3,
    ) {
        let mut run = crate::workflow::types::CheckRunWorkflow::start(
            crate::workflow::types::NewCheckRun {
                profit_year: 2025,
                check_run_date: run_day(),
                check_number: 1,
                max_reprint_count,
                created_by: "prop".to_string(),
            },
            Utc::now(),
        );
        run.reprint_count = reprint_count;
        let today = run_day() + chrono::Duration::days(day_offset);

        prop_assert_eq!(
            run.can_reprint(today),
            reprint_count < max_reprint_count && day_offset == 0
        );
    }
}
