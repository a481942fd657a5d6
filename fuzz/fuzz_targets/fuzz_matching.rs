#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lectern_core::MatchMode;
use lectern_core::matching::filter_with_indices;

#[derive(Debug, Arbitrary)]
struct Input {
    query: String,
    candidates: Vec<(String, String)>,
    ratio_percent: u8,
    mode: u8,
}

fuzz_target!(|input: Input| {
    let ratio_percent = u32::from(input.ratio_percent);
    let mode = match input.mode % 3 {
        0 => MatchMode::Substring,
        1 => MatchMode::Fuzzy { ratio_percent },
        _ => MatchMode::SubstringThenFuzzy { ratio_percent },
    };
    let title = |c: &(String, String)| c.0.clone();
    let body = |c: &(String, String)| c.1.clone();
    let hits = filter_with_indices(mode, &input.query, &input.candidates, &[&title, &body]);

    let mut seen = vec![false; input.candidates.len()];
    for &idx in &hits {
        assert!(idx < input.candidates.len());
        assert!(!seen[idx], "candidate emitted twice");
        seen[idx] = true;
    }
    if input.query.is_empty() {
        assert_eq!(hits.len(), input.candidates.len());
    }
});
