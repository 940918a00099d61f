//! Drift scan command with boundary logging.
//!
//! A scan runs in three phases:
//! - construct: raw `(type, id, attributes)` tuples become canonical
//!   resources through the registry's factories
//! - normalize: the middleware pipeline reshapes both sets
//! - diff: one unit per resource type, spread over a `rayon` pool and
//!   merged back in type order
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for a scan:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Core layers use only `tracing::debug!()` for internal details.

use crate::config::{Direction, ScanConfig};
use chrono::{DateTime, Utc};
use driftwatch_core::diff::{compute_changelog_for_type, diff_units};
use driftwatch_core::errors::{DwError, DwErrorKind};
use driftwatch_core::{log_op_end, log_op_error, log_op_start};
use driftwatch_core::{
    Attributes, CancellationToken, Change, Changelog, DiffSummary, Filter, Pipeline,
    PipelineOptions, ResourceSet, TypeRegistry,
};
use driftwatch_core_types::{ScanContext, ScanId, TraceId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// One enumerated resource before construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    /// JSON object, or `null` for no attributes
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl RawResource {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        attributes: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            attributes,
        }
    }
}

/// Both enumerations for one scan; no ordering assumed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanInput {
    #[serde(default)]
    pub declared: Vec<RawResource>,
    #[serde(default)]
    pub live: Vec<RawResource>,
}

impl ScanInput {
    pub fn new(declared: Vec<RawResource>, live: Vec<RawResource>) -> Self {
        Self { declared, live }
    }

    /// # Errors
    ///
    /// Returns `Serialization` if the document does not decode.
    pub fn from_json_str(content: &str) -> Result<Self, DwError> {
        serde_json::from_str(content).map_err(DwError::from)
    }
}

/// Result of one scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub context: ScanContext,
    pub direction: Direction,

    /// Normalized declared set
    pub declared: ResourceSet,

    /// Normalized live set
    pub live: ResourceSet,

    pub changelog: Changelog,

    /// Construction and stage errors collected in non-strict mode, plus a
    /// `Cancelled` entry when the token stopped the scan early
    pub warnings: Vec<DwError>,

    /// Pipeline stages that ran, in order
    pub stages_run: Vec<&'static str>,

    /// False if cancellation skipped a pipeline stage or a diff unit
    pub complete: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanOutcome {
    pub fn scan_id(&self) -> &ScanId {
        &self.context.scan_id
    }

    pub fn has_drift(&self) -> bool {
        !self.changelog.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        self.changelog.summary()
    }
}

/// Runs drift scans against a sealed registry
pub struct DriftScanner<'r> {
    registry: &'r TypeRegistry,
    pipeline: Pipeline,
    filter: Box<dyn Filter>,
    config: ScanConfig,
}

impl fmt::Debug for DriftScanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriftScanner")
            .field("pipeline", &self.pipeline)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'r> DriftScanner<'r> {
    /// Scanner with the built-in pipeline and the configured ignore rules
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` or `InvalidIgnoreRule` if `config` does not
    /// validate.
    pub fn new(registry: &'r TypeRegistry, config: ScanConfig) -> Result<Self, DwError> {
        config.validate()?;
        let filter = config.filter()?;
        let pipeline = Pipeline::builtin().with_options(PipelineOptions {
            fail_fast: config.strict,
        });

        Ok(Self {
            registry,
            pipeline,
            filter: Box::new(filter),
            config,
        })
    }

    /// Replace the pipeline; `fail_fast` follows the scanner's `strict`
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline.with_options(PipelineOptions {
            fail_fast: self.config.strict,
        });
        self
    }

    /// Replace the filter compiled from the configuration
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run a scan with a fresh [`ScanContext`]
    ///
    /// # Errors
    ///
    /// See [`DriftScanner::scan_with_context`].
    pub fn scan(&self, input: ScanInput, cancel: &CancellationToken) -> Result<ScanOutcome, DwError> {
        self.scan_with_context(input, cancel, ScanContext::new())
    }

    /// Run a scan under a caller-supplied context
    ///
    /// Cancellation is not an error: the outcome comes back with
    /// `complete = false` and whatever was computed before the token fired.
    ///
    /// # Errors
    ///
    /// - `RegistryNotSealed` if registration is still open
    /// - in strict mode, the first construction error, or `StageFailed`
    ///   for the first failing pipeline stage
    /// - `InternalInconsistency` from the diff engine
    pub fn scan_with_context(
        &self,
        input: ScanInput,
        cancel: &CancellationToken,
        context: ScanContext,
    ) -> Result<ScanOutcome, DwError> {
        let scan_id = context.scan_id.to_string();
        let trace_id = context.trace_id.clone();
        log_op_start!(
            "drift_scan",
            scan_id = scan_id.as_str(),
            trace_id = trace_id.as_ref().map(TraceId::as_str),
            declared_len = input.declared.len(),
            live_len = input.live.len()
        );
        let start = Instant::now();

        let outcome = self.scan_impl(input, cancel, context).map_err(|e| {
            log_op_error!(
                "drift_scan",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                scan_id = scan_id.as_str(),
                trace_id = trace_id.as_ref().map(TraceId::as_str)
            );
            e
        })?;

        log_op_end!(
            "drift_scan",
            duration_ms = start.elapsed().as_millis() as u64,
            scan_id = scan_id.as_str(),
            trace_id = trace_id.as_ref().map(TraceId::as_str),
            change_count = outcome.changelog.len(),
            warning_count = outcome.warnings.len(),
            complete = outcome.complete
        );

        Ok(outcome)
    }

    fn scan_impl(
        &self,
        input: ScanInput,
        cancel: &CancellationToken,
        context: ScanContext,
    ) -> Result<ScanOutcome, DwError> {
        let started_at = Utc::now();
        let scan_id = context.scan_id.clone();

        self.registry.ensure_sealed().map_err(|e| {
            DwError::from(e)
                .with_op("drift_scan")
                .with_scan_id(scan_id.clone())
        })?;

        // Construct
        let mut warnings = Vec::new();
        let mut declared = self.construct("declared", input.declared, &scan_id, &mut warnings)?;
        let mut live = self.construct("live", input.live, &scan_id, &mut warnings)?;

        // Normalize
        let report = self
            .pipeline
            .run(self.registry, &mut declared, &mut live, cancel);
        let mut stage_errors: Vec<DwError> = report
            .errors
            .into_iter()
            .map(|e| e.with_scan_id(scan_id.clone()))
            .collect();
        if self.config.strict {
            if let Some(failure) = stage_errors.pop() {
                return Err(failure);
            }
        }
        warnings.append(&mut stage_errors);

        // Diff
        let (changes, complete) = if report.cancelled {
            tracing::debug!(scan_id = %scan_id, "pipeline cancelled, skipping diff");
            (Vec::new(), false)
        } else {
            self.diff(&declared, &live, cancel)
                .map_err(|e| e.with_scan_id(scan_id.clone()))?
        };
        if !complete {
            let skipped = if report.cancelled {
                "cancelled during normalization, diff skipped"
            } else {
                "cancelled during diff, changelog is partial"
            };
            warnings.push(
                DwError::new(DwErrorKind::Cancelled)
                    .with_op("drift_scan")
                    .with_scan_id(scan_id.clone())
                    .with_message(skipped),
            );
        }

        Ok(ScanOutcome {
            context,
            direction: self.config.direction,
            declared,
            live,
            changelog: Changelog::from_changes(changes),
            warnings,
            stages_run: report.stages_run,
            complete,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Build one side; bad or duplicate entries become warnings, or fail
    /// the scan in strict mode
    fn construct(
        &self,
        side: &'static str,
        raws: Vec<RawResource>,
        scan_id: &ScanId,
        warnings: &mut Vec<DwError>,
    ) -> Result<ResourceSet, DwError> {
        let mut set = ResourceSet::new();

        for raw in raws {
            let built = Attributes::from_json(raw.attributes)
                .and_then(|attributes| {
                    self.registry
                        .factories()
                        .create(&raw.resource_type, &raw.id, attributes)
                })
                .and_then(|resource| set.insert(resource));

            if let Err(e) = built {
                let err = DwError::from(e)
                    .with_op("construct_resource")
                    .with_resource_type(raw.resource_type.clone())
                    .with_resource_id(raw.id.clone())
                    .with_scan_id(scan_id.clone());
                if self.config.strict {
                    return Err(err);
                }
                tracing::debug!(
                    side,
                    resource_type = raw.resource_type.as_str(),
                    resource_id = raw.id.as_str(),
                    code = err.code(),
                    "resource skipped"
                );
                warnings.push(err);
            }
        }

        tracing::debug!(side, resources = set.len(), "resource set constructed");
        Ok(set)
    }

    /// Per-type diff units on a dedicated pool, merged in type order
    fn diff(
        &self,
        declared: &ResourceSet,
        live: &ResourceSet,
        cancel: &CancellationToken,
    ) -> Result<(Vec<Change>, bool), DwError> {
        let (before, after) = match self.config.direction {
            Direction::DeclaredToLive => (declared, live),
            Direction::LiveToDeclared => (live, declared),
        };
        let units = diff_units(before, after);
        let schema = self.registry.schema();
        let filter: &dyn Filter = self.filter.as_ref();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .map_err(|e| {
                DwError::new(DwErrorKind::Internal)
                    .with_op("drift_scan")
                    .with_message(format!("Failed to create thread pool: {}", e))
            })?;

        let results: Vec<Option<Result<Vec<Change>, DwError>>> = pool.install(|| {
            units
                .par_iter()
                .map(|resource_type| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    Some(compute_changelog_for_type(
                        before,
                        after,
                        resource_type,
                        schema,
                        filter,
                    ))
                })
                .collect()
        });

        let mut changes = Vec::new();
        let mut complete = true;
        for (resource_type, result) in units.iter().zip(results) {
            match result {
                Some(unit) => changes.extend(unit?),
                None => {
                    tracing::debug!(
                        resource_type = resource_type.as_str(),
                        "diff unit skipped after cancellation"
                    );
                    complete = false;
                }
            }
        }

        Ok((changes, complete))
    }
}
