#![forbid(unsafe_code)]

//! Multi-field candidate filtering with an edit-distance fallback.
//!
//! Candidates are tested against one or more [`Extractor`]s, each mapping a
//! candidate to a single text field. Extractors are listed from most exact
//! to most lenient (title before body); a candidate is credited to the first
//! extractor that matches it and never emitted twice.
//!
//! # Search Behavior
//!
//! - [`filter`]: case-insensitive substring containment. Output groups
//!   matches by extractor, each group in candidate order.
//! - [`filter_fuzzy`]: accepts a field when the edit distance between the
//!   lowercased query and the lowercased field is below
//!   `ratio × query length` (30% by default). Within one extractor's group,
//!   closer matches come first; ties keep candidate order.
//! - An empty query returns every candidate in its original order and
//!   never computes a distance.
//!
//! All functions are deterministic: results depend only on the inputs and
//! never on hash iteration order.

/// Maps a candidate to one searchable text field.
pub type Extractor<'a, T> = &'a dyn Fn(&T) -> String;

/// Default fuzzy acceptance ratio, in percent of the query length.
pub const DEFAULT_FUZZY_RATIO_PERCENT: u32 = 30;

/// How candidates are compared against a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring containment.
    Substring,
    /// Edit distance below `ratio_percent`% of the query length.
    Fuzzy { ratio_percent: u32 },
    /// Substring first; edit distance only when substring finds nothing.
    SubstringThenFuzzy { ratio_percent: u32 },
}

impl Default for MatchMode {
    fn default() -> Self {
        Self::SubstringThenFuzzy {
            ratio_percent: DEFAULT_FUZZY_RATIO_PERCENT,
        }
    }
}

/// Filter `candidates` by substring containment across `extractors`.
#[must_use]
pub fn filter<T: Clone>(query: &str, candidates: &[T], extractors: &[Extractor<'_, T>]) -> Vec<T> {
    pick(candidates, filter_indices(query, candidates, extractors))
}

/// Like [`filter`], returning candidate positions instead of clones.
#[must_use]
pub fn filter_indices<T>(
    query: &str,
    candidates: &[T],
    extractors: &[Extractor<'_, T>],
) -> Vec<usize> {
    if query.is_empty() {
        return (0..candidates.len()).collect();
    }
    let needle = query.to_lowercase();
    let mut matched = vec![false; candidates.len()];
    let mut out = Vec::new();

    for extractor in extractors {
        for (idx, candidate) in candidates.iter().enumerate() {
            if matched[idx] {
                continue;
            }
            if extractor(candidate).to_lowercase().contains(&needle) {
                matched[idx] = true;
                out.push(idx);
            }
        }
    }

    tracing::trace!(
        query,
        candidates = candidates.len(),
        matched = out.len(),
        "substring filter"
    );
    out
}

/// Filter `candidates` by edit distance with the default 30% ratio.
#[must_use]
pub fn filter_fuzzy<T: Clone>(
    query: &str,
    candidates: &[T],
    extractors: &[Extractor<'_, T>],
) -> Vec<T> {
    pick(
        candidates,
        filter_fuzzy_indices(query, candidates, extractors, DEFAULT_FUZZY_RATIO_PERCENT),
    )
}

/// Edit-distance filter returning candidate positions.
///
/// A field is accepted when `distance * 100 < ratio_percent * query_len`
/// (lengths in chars). Integer comparison keeps the threshold exact.
#[must_use]
pub fn filter_fuzzy_indices<T>(
    query: &str,
    candidates: &[T],
    extractors: &[Extractor<'_, T>],
    ratio_percent: u32,
) -> Vec<usize> {
    if query.is_empty() {
        return (0..candidates.len()).collect();
    }
    let needle: Vec<char> = query.to_lowercase().chars().collect();
    let Some(max_distance) = max_accepted_distance(needle.len(), ratio_percent) else {
        return Vec::new();
    };

    let mut matched = vec![false; candidates.len()];
    let mut out = Vec::new();

    for extractor in extractors {
        // Candidates credited to an earlier extractor are not re-emitted,
        // so they are left out of this extractor's ranking entirely.
        let mut accepted: Vec<(usize, usize)> = Vec::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            if matched[idx] {
                continue;
            }
            let field: Vec<char> = extractor(candidate).to_lowercase().chars().collect();
            if let Some(distance) = edit_distance_bounded(&needle, &field, max_distance) {
                accepted.push((distance, idx));
            }
        }
        accepted.sort_by_key(|&(distance, _)| distance);
        for (_, idx) in accepted {
            matched[idx] = true;
            out.push(idx);
        }
    }

    tracing::trace!(
        query,
        candidates = candidates.len(),
        matched = out.len(),
        max_distance,
        "fuzzy filter"
    );
    out
}

/// Filter according to `mode`.
#[must_use]
pub fn filter_with<T: Clone>(
    mode: MatchMode,
    query: &str,
    candidates: &[T],
    extractors: &[Extractor<'_, T>],
) -> Vec<T> {
    pick(candidates, filter_with_indices(mode, query, candidates, extractors))
}

/// Position-returning form of [`filter_with`].
#[must_use]
pub fn filter_with_indices<T>(
    mode: MatchMode,
    query: &str,
    candidates: &[T],
    extractors: &[Extractor<'_, T>],
) -> Vec<usize> {
    match mode {
        MatchMode::Substring => filter_indices(query, candidates, extractors),
        MatchMode::Fuzzy { ratio_percent } => {
            filter_fuzzy_indices(query, candidates, extractors, ratio_percent)
        }
        MatchMode::SubstringThenFuzzy { ratio_percent } => {
            let exact = filter_indices(query, candidates, extractors);
            if exact.is_empty() {
                filter_fuzzy_indices(query, candidates, extractors, ratio_percent)
            } else {
                exact
            }
        }
    }
}

/// Whether `distance` passes the fuzzy threshold for a query of `query_len` chars.
#[must_use]
pub fn fuzzy_accepts(distance: usize, query_len: usize, ratio_percent: u32) -> bool {
    (distance as u128) * 100 < u128::from(ratio_percent) * (query_len as u128)
}

/// Largest distance that still passes [`fuzzy_accepts`], if any does.
fn max_accepted_distance(query_len: usize, ratio_percent: u32) -> Option<usize> {
    let budget = u128::from(ratio_percent) * (query_len as u128);
    if budget == 0 {
        return None;
    }
    usize::try_from((budget - 1) / 100).ok()
}

/// Levenshtein distance between two strings (in chars).
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    edit_distance_bounded(&a, &b, usize::MAX).unwrap_or(usize::MAX)
}

/// Bounded Levenshtein distance. Returns `None` if the distance exceeds `max`.
#[must_use]
pub fn edit_distance_bounded(a: &[char], b: &[char], max: usize) -> Option<usize> {
    let m = a.len();
    let n = b.len();

    if m.abs_diff(n) > max {
        return None;
    }
    if m == 0 {
        return (n <= max).then_some(n);
    }
    if n == 0 {
        return (m <= max).then_some(m);
    }

    // Two-row table.
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        let mut min_in_row = curr[0];

        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            min_in_row = min_in_row.min(curr[j]);
        }

        if min_in_row > max {
            return None;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    (prev[n] <= max).then_some(prev[n])
}

fn pick<T: Clone>(candidates: &[T], indices: Vec<usize>) -> Vec<T> {
    indices.into_iter().map(|i| candidates[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        title: &'static str,
        body: &'static str,
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry { title: "Genesis", body: "In the beginning" },
            Entry { title: "Exodus", body: "Now these are the names" },
            Entry { title: "Leviticus", body: "And the Lord called" },
            Entry { title: "Numbers", body: "In the wilderness of Genesis" },
        ]
    }

    fn title(e: &Entry) -> String {
        e.title.to_string()
    }

    fn body(e: &Entry) -> String {
        e.body.to_string()
    }

    // ── Substring ───────────────────────────────────────────────────

    #[test]
    fn empty_query_returns_all_in_order() {
        let items = entries();
        assert_eq!(filter("", &items, &[&title, &body]), items);
    }

    #[test]
    fn substring_is_case_insensitive() {
        let items = entries();
        let out = filter("EXO", &items, &[&title]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Exodus");
    }

    #[test]
    fn extractor_priority_orders_groups() {
        let items = entries();
        let out = filter_indices("gen", &items, &[&title, &body]);
        // Genesis by title first, then Numbers by body.
        assert_eq!(out, vec![0, 3]);
    }

    #[test]
    fn candidate_matching_both_fields_appears_once() {
        let items = entries();
        let out = filter_indices("e", &items, &[&title, &body]);
        let mut sorted = out.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), out.len());
    }

    #[test]
    fn no_match_is_empty() {
        let items = entries();
        assert!(filter("zzz", &items, &[&title, &body]).is_empty());
    }

    #[test]
    fn no_extractors_matches_nothing() {
        let items = entries();
        assert!(filter_indices("gen", &items, &[]).is_empty());
    }

    // ── Fuzzy ───────────────────────────────────────────────────────

    #[test]
    fn fuzzy_tolerates_typo() {
        let items = entries();
        let out = filter_fuzzy("gensis", &items, &[&title]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Genesis");
    }

    #[test]
    fn fuzzy_orders_by_distance() {
        let words = vec!["numbrs", "numbers", "numberz"];
        let field = |w: &&str| (*w).to_string();
        // "numbers": distance 1, 0, 1 → exact first, ties keep input order.
        let out = filter_fuzzy_indices("numbers", &words, &[&field], 30);
        assert_eq!(out, vec![1, 0, 2]);
    }

    #[test]
    fn fuzzy_empty_query_is_identity() {
        let items = entries();
        assert_eq!(filter_fuzzy("", &items, &[&title]), items);
    }

    #[test]
    fn fuzzy_short_query_requires_exact() {
        // len 3 → budget 90 → max distance 0
        let words = vec!["gen", "gem", "ge"];
        let field = |w: &&str| (*w).to_string();
        assert_eq!(filter_fuzzy_indices("gen", &words, &[&field], 30), vec![0]);
    }

    #[test]
    fn zero_ratio_accepts_nothing() {
        let words = vec!["gen"];
        let field = |w: &&str| (*w).to_string();
        assert!(filter_fuzzy_indices("gen", &words, &[&field], 0).is_empty());
    }

    #[test]
    fn substring_then_fuzzy_falls_back() {
        let items = entries();
        let mode = MatchMode::default();
        assert_eq!(filter_with(mode, "exo", &items, &[&title]).len(), 1);
        let out = filter_with(mode, "leviticsu", &items, &[&title]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Leviticus");
    }

    #[test]
    fn threshold_is_exact_at_boundary() {
        // len 10, ratio 30 → distance must be < 3
        assert!(fuzzy_accepts(2, 10, 30));
        assert!(!fuzzy_accepts(3, 10, 30));
        assert_eq!(max_accepted_distance(10, 30), Some(2));
        assert_eq!(max_accepted_distance(1, 30), Some(0));
        assert_eq!(max_accepted_distance(0, 30), None);
    }

    // ── Edit distance ───────────────────────────────────────────────

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("abc", "abd"), 1);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn bounded_distance_cuts_off() {
        let a: Vec<char> = "abc".chars().collect();
        let b: Vec<char> = "xyz".chars().collect();
        assert_eq!(edit_distance_bounded(&a, &b, 1), None);
        assert_eq!(edit_distance_bounded(&a, &b, 3), Some(3));
    }

    // ── Properties ──────────────────────────────────────────────────

    fn words() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(("[a-d]{0,6}", "[a-d]{0,6}"), 0..24)
    }

    proptest! {
        #[test]
        fn prop_no_duplicates(items in words(), query in "[a-d]{0,3}") {
            let first = |p: &(String, String)| p.0.clone();
            let second = |p: &(String, String)| p.1.clone();
            for out in [
                filter_indices(&query, &items, &[&first, &second]),
                filter_fuzzy_indices(&query, &items, &[&first, &second], 30),
            ] {
                let mut seen = vec![false; items.len()];
                for idx in out {
                    prop_assert!(!seen[idx]);
                    seen[idx] = true;
                }
            }
        }

        #[test]
        fn prop_empty_query_identity(items in words()) {
            let first = |p: &(String, String)| p.0.clone();
            let second = |p: &(String, String)| p.1.clone();
            prop_assert_eq!(filter("", &items, &[&first, &second]), items.clone());
            prop_assert_eq!(filter_fuzzy("", &items, &[&second, &first]), items);
        }

        #[test]
        fn prop_fuzzy_threshold(items in words(), query in "[a-d]{1,8}") {
            let first = |p: &(String, String)| p.0.clone();
            let out = filter_fuzzy_indices(&query, &items, &[&first], 30);
            let qlen = query.chars().count();
            for (idx, item) in items.iter().enumerate() {
                let d = edit_distance(&query, &item.0);
                if d * 100 >= 30 * qlen {
                    prop_assert!(!out.contains(&idx));
                }
                if d == 0 && 30 * qlen > 0 {
                    prop_assert!(out.contains(&idx));
                }
            }
        }

        #[test]
        fn prop_substring_results_contain_query(items in words(), query in "[a-d]{1,3}") {
            let first = |p: &(String, String)| p.0.clone();
            for idx in filter_indices(&query, &items, &[&first]) {
                prop_assert!(items[idx].0.contains(&query));
            }
        }

        #[test]
        fn prop_deterministic(items in words(), query in "[a-d]{0,3}") {
            let first = |p: &(String, String)| p.0.clone();
            let second = |p: &(String, String)| p.1.clone();
            let a = filter_fuzzy_indices(&query, &items, &[&first, &second], 30);
            let b = filter_fuzzy_indices(&query, &items, &[&first, &second], 30);
            prop_assert_eq!(a, b);
        }
    }
}
