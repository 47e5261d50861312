//! Candidate deduplication.
//!
//! Two separate checks live here:
//! - identity dedup across paginated search results (`merge`)
//! - near-duplicate detection of a candidate against a day's visits
//!   (`find_near_duplicate`), run at insertion time

use std::collections::HashSet;

use crate::domain::{Candidate, Visit};

/// Coordinate tolerance, in decimal degrees, for treating two places with
/// the same name as one (~100 m).
pub const NEAR_DUPLICATE_DEGREES: f64 = 0.001;

/// Merge one page of search results into the accumulated candidate list.
///
/// Each candidate id appears exactly once in the output. The first
/// occurrence wins, whether it came from `existing` or earlier in
/// `incoming`. Order is otherwise preserved.
///
/// # Examples
///
/// ```
/// use trip_server::domain::Candidate;
/// use trip_server::search::merge;
///
/// let page = |ids: &[&str]| -> Vec<Candidate> {
///     ids.iter().map(|id| Candidate::new(*id, *id, "cafe")).collect()
/// };
///
/// let first = merge(&[], page(&["1", "2", "3"]));
/// let merged = merge(&first, page(&["3", "4", "5"]));
/// let ids: Vec<_> = merged.iter().map(|c| c.id.as_str()).collect();
/// assert_eq!(ids, ["1", "2", "3", "4", "5"]);
/// ```
pub fn merge(existing: &[Candidate], incoming: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len() + incoming.len());
    let mut result = Vec::with_capacity(existing.len() + incoming.len());

    for candidate in existing.iter().cloned().chain(incoming) {
        if seen.insert(candidate.id.clone()) {
            result.push(candidate);
        }
    }

    result
}

/// Find a visit in `visits` that the candidate would duplicate.
///
/// A visit matches when its name equals the candidate's name ignoring case
/// and both coordinates differ by less than [`NEAR_DUPLICATE_DEGREES`].
/// Two places that both lack a usable location match on name alone; a
/// located place never matches an unlocated one.
pub fn find_near_duplicate<'a>(visits: &'a [Visit], candidate: &Candidate) -> Option<&'a Visit> {
    let name = candidate.name.to_lowercase();

    visits.iter().find(|visit| {
        if visit.name.to_lowercase() != name {
            return false;
        }
        match (&visit.location, &candidate.location) {
            (Some(a), Some(b)) => a.is_within(b, NEAR_DUPLICATE_DEGREES),
            (None, None) => true,
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;

    fn candidates(ids: &[&str]) -> Vec<Candidate> {
        ids.iter()
            .map(|id| Candidate::new(*id, format!("Place {id}"), "cafe"))
            .collect()
    }

    fn ids(list: &[Candidate]) -> Vec<&str> {
        list.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn overlapping_pages() {
        let page1 = merge(&[], candidates(&["1", "2", "3"]));
        let merged = merge(&page1, candidates(&["3", "4", "5"]));
        assert_eq!(ids(&merged), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn duplicates_within_one_page() {
        let merged = merge(&[], candidates(&["1", "2", "1", "3", "2"]));
        assert_eq!(ids(&merged), vec!["1", "2", "3"]);
    }

    #[test]
    fn first_occurrence_wins() {
        let existing = vec![Candidate::new("7", "Original", "cafe")];
        let incoming = vec![Candidate::new("7", "Replacement", "cafe")];
        let merged = merge(&existing, incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Original");
    }

    fn located_visit(name: &str, lat: f64, lon: f64) -> Visit {
        let mut v = Visit::new("v", name, "cafe");
        v.location = Some(Coordinates::new(lat, lon));
        v
    }

    fn located_candidate(name: &str, lat: f64, lon: f64) -> Candidate {
        let mut c = Candidate::new("c", name, "cafe");
        c.location = Some(Coordinates::new(lat, lon));
        c
    }

    #[test]
    fn near_duplicate_same_name_close_by() {
        let visits = vec![located_visit("old quarter cafe", 21.0301, 105.8501)];
        let candidate = located_candidate("Old Quarter Cafe", 21.0300, 105.8500);
        assert!(find_near_duplicate(&visits, &candidate).is_some());
    }

    #[test]
    fn same_name_far_away_is_distinct() {
        let visits = vec![located_visit("Highlands Coffee", 21.0300, 105.8500)];
        let candidate = located_candidate("Highlands Coffee", 21.0400, 105.8500);
        assert!(find_near_duplicate(&visits, &candidate).is_none());
    }

    #[test]
    fn different_name_same_spot_is_distinct() {
        let visits = vec![located_visit("Cafe A", 21.03, 105.85)];
        let candidate = located_candidate("Cafe B", 21.03, 105.85);
        assert!(find_near_duplicate(&visits, &candidate).is_none());
    }

    #[test]
    fn unlocated_places_match_on_name() {
        let visits = vec![Visit::new("v", "Night Market", "shopping")];
        let unlocated = Candidate::new("c", "night market", "shopping");
        let located = located_candidate("night market", 21.03, 105.85);

        assert!(find_near_duplicate(&visits, &unlocated).is_some());
        assert!(find_near_duplicate(&visits, &located).is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn page_strategy() -> impl Strategy<Value = Vec<Candidate>> {
        // Few distinct ids so pages overlap often.
        prop::collection::vec(0u8..12, 0..20).prop_map(|ids| {
            ids.into_iter()
                .map(|id| Candidate::new(id.to_string(), format!("P{id}"), "cafe"))
                .collect()
        })
    }

    proptest! {
        /// Output ids are unique
        #[test]
        fn merge_ids_unique(existing in page_strategy(), incoming in page_strategy()) {
            let base = merge(&[], existing);
            let merged = merge(&base, incoming);
            let unique: HashSet<_> = merged.iter().map(|c| c.id.clone()).collect();
            prop_assert_eq!(unique.len(), merged.len());
        }

        /// Merging the same page twice equals merging it once
        #[test]
        fn merge_idempotent(existing in page_strategy(), incoming in page_strategy()) {
            let base = merge(&[], existing);
            let once = merge(&base, incoming.clone());
            let twice = merge(&once, incoming);
            prop_assert_eq!(once, twice);
        }

        /// Existing candidates keep their positions at the front
        #[test]
        fn merge_preserves_existing_prefix(existing in page_strategy(), incoming in page_strategy()) {
            let base = merge(&[], existing);
            let merged = merge(&base, incoming);
            prop_assert_eq!(&merged[..base.len()], &base[..]);
        }
    }
}
