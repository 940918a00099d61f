//! Drift scan integration tests.
//!
//! Exercise the full construct, normalize and diff path through
//! [`DriftScanner`], including strictness, direction, ignore rules and
//! cancellation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{declared_account, live_account, raw, registry};
use driftwatch_core::middleware::{Middleware, TagsNormalizer};
use driftwatch_core::{
    CancellationToken, ChangeKind, DwError, DwErrorKind, Pipeline, ResourceSet, TypeRegistry,
};
use driftwatch_core_types::{ScanContext, ScanId};
use driftwatch_engine::{Direction, DriftScanner, ScanConfig, ScanInput};
use serde_json::json;

fn scan(config: ScanConfig, input: ScanInput) -> Result<driftwatch_engine::ScanOutcome, DwError> {
    let registry = registry();
    let scanner = DriftScanner::new(&registry, config).unwrap();
    scanner.scan(input, &CancellationToken::new())
}

fn account() -> ScanInput {
    ScanInput::new(declared_account(), live_account())
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

// S1: after normalization only the unmanaged volume is drift
#[test]
fn test_account_scan_reports_only_unmanaged_volume() {
    let outcome = scan(ScanConfig::default(), account()).unwrap();

    assert!(outcome.complete);
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(outcome.changelog.len(), 1);

    let change = &outcome.changelog.changes[0];
    assert_eq!(change.resource_type, "aws_ebs_volume");
    assert_eq!(change.resource_id, "v9");
    assert_eq!(change.kind, ChangeKind::Created);
    assert!(change.is_resource_level());

    assert!(outcome.declared.find("aws_ebs_volume", "v1").is_some());
    assert_eq!(outcome.summary().resources_created, 1);
}

// S2: a real attribute difference survives normalization
#[test]
fn test_changed_volume_size_is_reported() {
    let mut live = live_account();
    live[1] = raw(
        "aws_ebs_volume",
        "v1",
        json!({"availability_zone": "eu-west-3", "size": 10, "tags": {"Name": "root"}, "type": "gp2"}),
    );

    let outcome = scan(ScanConfig::default(), ScanInput::new(declared_account(), live)).unwrap();

    let updates: Vec<_> = outcome
        .changelog
        .iter()
        .filter(|c| c.kind == ChangeKind::Updated)
        .collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].resource_id, "v1");
    assert_eq!(updates[0].path_string(), "size");
}

// S3: reversing the direction swaps what counts as created
#[test]
fn test_live_to_declared_direction() {
    let config = ScanConfig::default().with_direction(Direction::LiveToDeclared);

    let outcome = scan(config, account()).unwrap();

    assert_eq!(outcome.direction, Direction::LiveToDeclared);
    let entries: Vec<(String, ChangeKind, String)> = outcome
        .changelog
        .iter()
        .map(|c| (c.key().to_string(), c.kind, c.path_string()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("aws_ebs_volume.v1".to_string(), ChangeKind::Deleted, "arn".to_string()),
            ("aws_ebs_volume.v9".to_string(), ChangeKind::Deleted, String::new()),
            ("aws_instance.i-1".to_string(), ChangeKind::Deleted, "arn".to_string()),
        ]
    );
}

// S4: configured ignore lines reach the diff engine
#[test]
fn test_ignore_lines_from_config() {
    let config = ScanConfig::default().with_ignore("aws_ebs_volume.v9");

    let outcome = scan(config, account()).unwrap();

    assert!(!outcome.has_drift());
}

// ---------------------------------------------------------------------------
// Construction errors
// ---------------------------------------------------------------------------

fn account_with_bad_volume() -> ScanInput {
    let mut input = account();
    input
        .live
        .push(raw("aws_ebs_volume", "v-bad", json!({"size": "lots"})));
    input
        .live
        .push(raw("aws_ebs_volume", "v9", json!({"size": 2})));
    input.live.push(raw("aws_ebs_volume", "v-list", json!([1, 2])));
    input
}

// S5: malformed and duplicate entries become warnings
#[test]
fn test_construction_errors_are_warnings() {
    let outcome = scan(ScanConfig::default(), account_with_bad_volume()).unwrap();

    let kinds: Vec<(DwErrorKind, Option<&str>)> = outcome
        .warnings
        .iter()
        .map(|w| (w.kind(), w.resource_id()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (DwErrorKind::MalformedAttribute, Some("v-bad")),
            (DwErrorKind::DuplicateResource, Some("v9")),
            (DwErrorKind::InvalidInput, Some("v-list")),
        ]
    );
    assert!(outcome
        .warnings
        .iter()
        .all(|w| w.op() == Some("construct_resource") && w.scan_id() == Some(outcome.scan_id())));

    // The first v9 wins; the scan result is otherwise unchanged
    assert_eq!(outcome.changelog.len(), 1);
    assert_eq!(
        outcome.live.find("aws_ebs_volume", "v9").unwrap().attributes.get("size"),
        Some(&driftwatch_core::AttrValue::Int(1))
    );
}

// S6: strict mode fails on the first construction error
#[test]
fn test_strict_mode_fails_on_construction_error() {
    let err = scan(ScanConfig::default().with_strict(true), account_with_bad_volume()).unwrap_err();

    assert_eq!(err.kind(), DwErrorKind::MalformedAttribute);
    assert_eq!(err.resource_id(), Some("v-bad"));
    assert_eq!(err.field(), Some("size"));
}

// ---------------------------------------------------------------------------
// Stage errors
// ---------------------------------------------------------------------------

fn account_with_unnamed_device() -> ScanInput {
    let mut input = account();
    input.declared.push(raw(
        "aws_instance",
        "i-2",
        json!({"ebs_block_device": [{"volume_size": 4}]}),
    ));
    input
}

// S7: stage errors are reported next to the partial result
#[test]
fn test_stage_error_is_warning() {
    let outcome = scan(ScanConfig::default(), account_with_unnamed_device()).unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    let warning = &outcome.warnings[0];
    assert_eq!(warning.kind(), DwErrorKind::MissingAttribute);
    assert_eq!(warning.stage(), Some("aws_instance_block_device"));
    assert_eq!(warning.field(), Some("ebs_block_device.0.volume_id"));

    // i-2 is declared but not live
    assert!(outcome
        .changelog
        .iter()
        .any(|c| c.resource_id == "i-2" && c.kind == ChangeKind::Deleted));
}

// S8: strict mode stops the pipeline and fails the scan
#[test]
fn test_strict_mode_fails_on_stage_error() {
    let err = scan(ScanConfig::default().with_strict(true), account_with_unnamed_device()).unwrap_err();

    assert_eq!(err.kind(), DwErrorKind::StageFailed);
    assert_eq!(err.stage(), Some("aws_instance_block_device"));
    assert_eq!(
        err.source_error().map(DwError::kind),
        Some(DwErrorKind::MissingAttribute)
    );
}

// ---------------------------------------------------------------------------
// Registry lifecycle
// ---------------------------------------------------------------------------

// S9: scanning before registration is sealed is a configuration error
#[test]
fn test_unsealed_registry_fails_scan() {
    let registry = TypeRegistry::new();
    let scanner = DriftScanner::new(&registry, ScanConfig::default()).unwrap();
    let scan_id = ScanId::from_string("unsealed-scan".to_string());

    let err = scanner
        .scan_with_context(
            account(),
            &CancellationToken::new(),
            ScanContext::with_scan_id(scan_id.clone()),
        )
        .unwrap_err();

    assert_eq!(err.kind(), DwErrorKind::RegistryNotSealed);
    assert!(err.kind().is_configuration_error());
    assert_eq!(err.op(), Some("drift_scan"));
    assert_eq!(err.scan_id(), Some(&scan_id));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

// S10: a token cancelled up front yields an empty, incomplete outcome
#[test]
fn test_cancelled_before_start() {
    let registry = registry();
    let scanner = DriftScanner::new(&registry, ScanConfig::default()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = scanner.scan(account(), &cancel).unwrap();

    assert!(!outcome.complete);
    assert!(outcome.stages_run.is_empty());
    assert!(outcome.changelog.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind(), DwErrorKind::Cancelled);
    assert_eq!(outcome.warnings[0].scan_id(), Some(outcome.scan_id()));
}

/// Fires the token while the pipeline is running
struct CancelDuringPipeline(CancellationToken);

impl Middleware for CancelDuringPipeline {
    fn name(&self) -> &'static str {
        "cancel_during_pipeline"
    }

    fn execute(
        &self,
        _registry: &TypeRegistry,
        _declared: &mut ResourceSet,
        _live: &mut ResourceSet,
    ) -> Vec<DwError> {
        self.0.cancel();
        Vec::new()
    }
}

// S11: cancellation between stages keeps the work done so far
#[test]
fn test_cancelled_between_stages() {
    let registry = registry();
    let cancel = CancellationToken::new();
    let pipeline = Pipeline::new()
        .with_stage(CancelDuringPipeline(cancel.clone()))
        .with_stage(TagsNormalizer);
    let scanner = DriftScanner::new(&registry, ScanConfig::default())
        .unwrap()
        .with_pipeline(pipeline);

    let outcome = scanner.scan(account(), &cancel).unwrap();

    assert!(!outcome.complete);
    assert_eq!(outcome.stages_run, vec!["cancel_during_pipeline"]);
    assert!(outcome.changelog.is_empty());
    assert_eq!(
        outcome
            .warnings
            .iter()
            .filter(|w| w.kind() == DwErrorKind::Cancelled)
            .count(),
        1
    );
    // Tags were never normalized
    assert!(outcome
        .live
        .find("aws_instance", "i-1")
        .unwrap()
        .attributes
        .contains_key("tags_all"));
}

// ---------------------------------------------------------------------------
// Input decoding
// ---------------------------------------------------------------------------

// S12: scan input decodes from the enumeration JSON shape
#[test]
fn test_scan_input_from_json() {
    let input = ScanInput::from_json_str(
        r#"{
            "declared": [{"type": "aws_instance", "id": "i-1", "attributes": {"ami": "a"}}],
            "live": [{"type": "aws_instance", "id": "i-1", "attributes": {"ami": "b"}}]
        }"#,
    )
    .unwrap();

    let outcome = scan(ScanConfig::default(), input).unwrap();

    assert_eq!(outcome.changelog.len(), 1);
    assert_eq!(outcome.changelog.changes[0].path_string(), "ami");
}
