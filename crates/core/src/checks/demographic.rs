//! Current identity resolution.
//!
//! An SSN may map to several identity records (rehire or merge history).
//! The winner is chosen by a total order so reruns always pick the same
//! record regardless of the order rows come back in.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::warn;

use checkrun_shared::Ssn;

use super::types::Demographic;
use crate::error::CheckRunError;
use crate::ports::DemographicReader;

/// Validation field used for missing identities.
pub const DEMOGRAPHICS_FIELD: &str = "Demographics";

/// Sort key: external id descending (missing last), then effective
/// timestamp descending, then record id ascending.
fn selection_key(
    demographic: &Demographic,
) -> (Reverse<Option<i64>>, Reverse<DateTime<Utc>>, i64) {
    (
        Reverse(demographic.external_id),
        Reverse(demographic.effective_timestamp()),
        demographic.id,
    )
}

/// Picks the current record among candidates sharing one SSN.
#[must_use]
pub fn select_current(candidates: &[Demographic]) -> Option<&Demographic> {
    candidates.iter().min_by_key(|d| selection_key(d))
}

/// Stateless resolver from SSNs to one current identity each.
pub struct DemographicResolver;

impl DemographicResolver {
    /// Resolves every SSN in `ssns` to exactly one identity record.
    ///
    /// Duplicates are resolved with [`select_current`] and logged as a
    /// warning; they never fail the call.
    ///
    /// # Errors
    ///
    /// Returns a validation failure on `Demographics` listing every SSN
    /// (masked) that has no identity record at all.
    pub async fn resolve_current(
        reader: &dyn DemographicReader,
        ssns: &[Ssn],
    ) -> Result<BTreeMap<Ssn, Demographic>, CheckRunError> {
        let wanted: BTreeSet<Ssn> = ssns.iter().copied().collect();
        let lookup: Vec<Ssn> = wanted.iter().copied().collect();
        let rows = reader.find_by_ssns(&lookup).await?;

        let mut by_ssn: BTreeMap<Ssn, Vec<Demographic>> = BTreeMap::new();
        for row in rows {
            if wanted.contains(&row.ssn) {
                by_ssn.entry(row.ssn).or_default().push(row);
            }
        }

        let missing: Vec<String> = wanted
            .iter()
            .filter(|ssn| !by_ssn.contains_key(ssn))
            .map(|ssn| ssn.masked())
            .collect();
        if !missing.is_empty() {
            return Err(CheckRunError::validation(
                DEMOGRAPHICS_FIELD,
                format!(
                    "No demographics were found for one or more SSNs: {}",
                    missing.join(", ")
                ),
            ));
        }

        let mut resolved = BTreeMap::new();
        for (ssn, candidates) in by_ssn {
            let Some(selected) = select_current(&candidates) else {
                continue;
            };
            if candidates.len() > 1 {
                warn!(
                    ssn = %ssn.masked(),
                    selected_external_id = ?selected.external_id,
                    candidates = candidates.len(),
                    "Multiple demographics found for SSN; selecting deterministically"
                );
            }
            resolved.insert(ssn, selected.clone());
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCheckRunStore;
    use chrono::TimeZone;

    fn ssn(value: i32) -> Ssn {
        Ssn::new(value).unwrap()
    }

    fn demographic(
        id: i64,
        ssn_value: i32,
        external_id: Option<i64>,
        created_day: u32,
        modified_day: Option<u32>,
    ) -> Demographic {
        Demographic {
            id,
            ssn: ssn(ssn_value),
            badge_number: i32::try_from(id).unwrap() + 700_000,
            external_id,
            created_at_utc: Utc.with_ymd_and_hms(2024, 1, created_day, 0, 0, 0).unwrap(),
            modified_at_utc: modified_day
                .map(|day| Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_higher_external_id_wins() {
        let low = demographic(1, 111_223_333, Some(100), 1, None);
        let high = demographic(2, 111_223_333, Some(200), 1, None);

        assert_eq!(select_current(&[low.clone(), high.clone()]).unwrap().id, 2);
        assert_eq!(select_current(&[high, low]).unwrap().id, 2);
    }

    #[test]
    fn test_missing_external_id_loses() {
        let none = demographic(1, 111_223_333, None, 20, Some(20));
        let some = demographic(2, 111_223_333, Some(1), 1, None);
        assert_eq!(select_current(&[none, some]).unwrap().id, 2);
    }

    #[test]
    fn test_timestamp_breaks_external_id_tie() {
        let older = demographic(1, 111_223_333, Some(100), 5, None);
        let modified = demographic(2, 111_223_333, Some(100), 1, Some(3));
        let newer_created = demographic(3, 111_223_333, Some(100), 10, None);

        // Modified in February beats anything created in January.
        let candidates = [older, newer_created, modified];
        assert_eq!(select_current(&candidates).unwrap().id, 2);
    }

    #[test]
    fn test_identical_candidates_resolve_by_id() {
        let a = demographic(9, 111_223_333, Some(100), 1, None);
        let b = demographic(4, 111_223_333, Some(100), 1, None);
        assert_eq!(select_current(&[a.clone(), b.clone()]).unwrap().id, 4);
        assert_eq!(select_current(&[b, a]).unwrap().id, 4);
    }

    #[tokio::test]
    async fn test_resolve_current_picks_one_per_ssn() {
        let store = InMemoryCheckRunStore::new();
        store
            .insert_demographic(demographic(1, 111_223_333, Some(100), 1, None))
            .await;
        store
            .insert_demographic(demographic(2, 111_223_333, Some(200), 1, None))
            .await;
        store
            .insert_demographic(demographic(3, 444_556_666, Some(50), 1, None))
            .await;

        let resolved = DemographicResolver::resolve_current(
            &store,
            &[ssn(111_223_333), ssn(444_556_666), ssn(111_223_333)],
        )
        .await
        .unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&ssn(111_223_333)].id, 2);
        assert_eq!(resolved[&ssn(444_556_666)].id, 3);
    }

    #[tokio::test]
    async fn test_resolve_current_lists_all_missing_masked() {
        let store = InMemoryCheckRunStore::new();
        store
            .insert_demographic(demographic(1, 111_223_333, Some(100), 1, None))
            .await;

        let err = DemographicResolver::resolve_current(
            &store,
            &[ssn(111_223_333), ssn(987_654_321), ssn(555_001_234)],
        )
        .await
        .unwrap_err();

        let messages = err.field_errors(DEMOGRAPHICS_FIELD).unwrap();
        assert!(messages[0].contains("xxx-xx-4321"));
        assert!(messages[0].contains("xxx-xx-1234"));
        assert!(!messages[0].contains("987654321"));
        assert!(!messages[0].contains("3333"));
    }
}
