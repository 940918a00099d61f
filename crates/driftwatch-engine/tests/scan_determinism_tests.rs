//! Parallel diff determinism tests.
//!
//! The diff phase runs one unit per resource type on a thread pool; the
//! merged changelog must not depend on how many workers ran it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{raw, registry};
use driftwatch_core::CancellationToken;
use driftwatch_engine::{DriftScanner, RawResource, ScanConfig, ScanInput};
use proptest::prelude::*;
use serde_json::json;

fn changelog_json(input: &ScanInput, jobs: usize) -> String {
    let registry = registry();
    let scanner = DriftScanner::new(&registry, ScanConfig::default().with_jobs(jobs)).unwrap();
    scanner
        .scan(input.clone(), &CancellationToken::new())
        .unwrap()
        .changelog
        .to_json_string()
        .unwrap()
}

/// Many types so several diff units run concurrently
fn wide_input() -> ScanInput {
    let mut declared = Vec::new();
    let mut live = Vec::new();
    for t in 0..12 {
        let resource_type = format!("custom_type_{:02}", t);
        for i in 0..5 {
            let id = format!("r-{}", i);
            if i != 0 {
                declared.push(raw(&resource_type, &id, json!({"n": i, "shared": "x"})));
            }
            if i != 4 {
                live.push(raw(&resource_type, &id, json!({"n": i * t, "shared": "x"})));
            }
        }
    }
    ScanInput::new(declared, live)
}

// S1: one worker and many workers produce the same bytes
#[test]
fn test_changelog_independent_of_jobs() {
    let input = wide_input();

    let sequential = changelog_json(&input, 1);
    assert_eq!(changelog_json(&input, 2), sequential);
    assert_eq!(changelog_json(&input, 8), sequential);
}

// S2: input order does not matter
#[test]
fn test_changelog_independent_of_input_order() {
    let input = wide_input();
    let mut reversed = input.clone();
    reversed.declared.reverse();
    reversed.live.reverse();

    assert_eq!(changelog_json(&input, 4), changelog_json(&reversed, 4));
}

// S3: merged output is ordered by type
#[test]
fn test_units_merged_in_type_order() {
    let registry = registry();
    let scanner = DriftScanner::new(&registry, ScanConfig::default().with_jobs(6)).unwrap();

    let outcome = scanner
        .scan(wide_input(), &CancellationToken::new())
        .unwrap();

    let types: Vec<&str> = outcome
        .changelog
        .iter()
        .map(|c| c.resource_type.as_str())
        .collect();
    let mut sorted = types.clone();
    sorted.sort();
    assert_eq!(types, sorted);
    assert!(outcome.complete);
}

fn arb_raw_set() -> impl Strategy<Value = Vec<RawResource>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["custom_a", "custom_b", "custom_c"]),
            0u8..4,
            0i64..3,
        ),
        0..12,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(ty, id, n)| raw(ty, &format!("r-{}", id), json!({"n": n})))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_jobs_do_not_change_output(declared in arb_raw_set(), live in arb_raw_set()) {
        let input = ScanInput::new(declared, live);
        prop_assert_eq!(changelog_json(&input, 1), changelog_json(&input, 3));
    }
}
