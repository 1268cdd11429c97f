//! Property-based tests for RunWorkflowManager.
//!
//! Random operation sequences are replayed against the in-memory store and
//! checked against the workflow invariants.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;

use crate::clock::FixedClock;
use crate::error::CheckRunError;
use crate::memory::InMemoryCheckRunStore;
use crate::workflow::service::RunWorkflowManager;
use crate::workflow::types::StepStatus;

#[derive(Debug, Clone)]
enum Op {
    Start { year: i32 },
    Complete { year: i32 },
    Reprint { year: i32 },
}

/// Strategy for generating workflow operations over three profit years.
fn arb_op() -> impl Strategy<Value = Op> {
    let year = 2023i32..2026;
    prop_oneof![
        year.clone().prop_map(|year| Op::Start { year }),
        year.clone().prop_map(|year| Op::Complete { year }),
        year.prop_map(|year| Op::Reprint { year }),
    ]
}

fn run_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 15).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// At most one active run per year, whatever the operation order.
    #[test]
    fn prop_at_most_one_active_run_per_year(ops in prop::collection::vec(arb_op(), 1..40)) {
        runtime().block_on(async {
            let store = Arc::new(InMemoryCheckRunStore::new());
            let manager =
                RunWorkflowManager::new(store.clone(), Arc::new(FixedClock::new(run_day())), 2);

            // Model: year -> reprints used by the active run.
            let mut model: HashMap<i32, i32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Start { year } => {
                        let result = manager.start_new_run(year, run_day(), 1, "prop").await;
                        if model.contains_key(&year) {
                            let already_active =
                                matches!(result, Err(CheckRunError::RunAlreadyActive { .. }));
                            prop_assert!(already_active);
                        } else {
                            prop_assert!(result.is_ok());
                            model.insert(year, 0);
                        }
                    }
                    Op::Complete { year } => {
                        let current = manager.get_current_run(year).await;
                        if model.remove(&year).is_some() {
                            let run = current.unwrap();
                            let done = manager
                                .record_step_completion(run.id, run.step_number, "prop")
                                .await
                                .unwrap();
                            prop_assert_eq!(done.step_status, StepStatus::Completed);
                            prop_assert_eq!(done.step_number, run.step_number + 1);
                        } else {
                            prop_assert!(matches!(current, Err(CheckRunError::NotFound(_))));
                        }
                    }
                    Op::Reprint { year } => {
                        let Some(used) = model.get_mut(&year) else {
                            continue;
                        };
                        let run = manager.get_current_run(year).await.unwrap();
                        let allowed = manager.can_reprint(run.id).await.unwrap();
                        prop_assert_eq!(allowed, *used < 2);
                        if allowed {
                            let run = manager.increment_reprint_count(run.id, "prop").await.unwrap();
                            *used += 1;
                            prop_assert_eq!(run.reprint_count, *used);
                        }
                    }
                }
            }

            let runs = store.workflows().await;
            for year in 2023..2026 {
                let active = runs
                    .iter()
                    .filter(|run| run.profit_year == year && run.is_active())
                    .count();
                prop_assert_eq!(active, usize::from(model.contains_key(&year)));
            }
            Ok(())
        })?;
    }
}
