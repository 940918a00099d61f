//! Middleware pipeline: reshapes raw resource sets into canonical form.
//!
//! Declared and live representations of the same infrastructure rarely
//! line up one to one. Each [`Middleware`] stage encodes one such
//! reconciliation rule. Stages run strictly in the order they were added,
//! and each stage sees the output of the previous one.
//!
//! Guarantees:
//! - The stage list is explicit and inspectable via [`Pipeline::stage_names`]
//! - A stage never leaves two resources with the same `(type, id)` in a set
//! - Per-entry failures are collected; a stage keeps going after one
//! - Cancellation is honored between stages only

pub mod block_device;
pub mod defaults;
pub mod sensitive;
pub mod tags;

use crate::cancel::CancellationToken;
use crate::errors::{DwError, DwErrorKind};
use crate::model::ResourceSet;
use crate::registry::TypeRegistry;
use std::fmt;

pub use block_device::AwsInstanceBlockDeviceMapper;
pub use defaults::DefaultValueSuppressor;
pub use sensitive::SensitiveFieldRedactor;
pub use tags::TagsNormalizer;

/// One normalization stage
///
/// `execute` receives both sets: a stage may read either, create resources
/// through the registry's factories, and mutate or remove resources. It
/// returns the errors it hit; an empty vector means the stage was clean.
pub trait Middleware: Send + Sync {
    /// Stable stage identifier, used in logs and collected errors
    fn name(&self) -> &'static str;

    fn execute(
        &self,
        registry: &TypeRegistry,
        declared: &mut ResourceSet,
        live: &mut ResourceSet,
    ) -> Vec<DwError>;
}

/// How the pipeline reacts to stage errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Stop after the first stage that reports any error
    pub fail_fast: bool,
}

/// What happened during one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    /// Stages that ran, in order
    pub stages_run: Vec<&'static str>,

    /// Every error reported, tagged with its stage
    pub errors: Vec<DwError>,

    /// True if cancellation stopped the run before all stages ran
    pub cancelled: bool,
}

impl PipelineReport {
    /// No errors and every stage ran
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }
}

/// Ordered list of middleware stages
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Middleware>>,
    options: PipelineOptions,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("options", &self.options)
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in stages in their canonical order
    pub fn builtin() -> Self {
        Self::new()
            .with_stage(AwsInstanceBlockDeviceMapper)
            .with_stage(TagsNormalizer)
            .with_stage(DefaultValueSuppressor)
            .with_stage(SensitiveFieldRedactor::new())
    }

    pub fn with_stage(mut self, stage: impl Middleware + 'static) -> Self {
        self.push(stage);
        self
    }

    pub fn push(&mut self, stage: impl Middleware + 'static) {
        self.stages.push(Box::new(stage));
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Stage identifiers in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage over both sets
    ///
    /// The cancellation token is checked before each stage. With
    /// `fail_fast`, a stage reporting errors stops the run and a
    /// `StageFailed` error wrapping its first error is appended.
    pub fn run(
        &self,
        registry: &TypeRegistry,
        declared: &mut ResourceSet,
        live: &mut ResourceSet,
        cancel: &CancellationToken,
    ) -> PipelineReport {
        let mut report = PipelineReport::default();

        for stage in &self.stages {
            let name = stage.name();
            if cancel.is_cancelled() {
                tracing::debug!(stage = name, "pipeline cancelled before stage");
                report.cancelled = true;
                break;
            }

            let errors: Vec<DwError> = stage
                .execute(registry, declared, live)
                .into_iter()
                .map(|e| match e.stage() {
                    Some(_) => e,
                    None => e.with_stage(name),
                })
                .collect();

            tracing::debug!(
                stage = name,
                errors = errors.len(),
                declared_len = declared.len(),
                live_len = live.len(),
                "pipeline stage finished"
            );
            report.stages_run.push(name);

            let first_error = errors.first().cloned();
            report.errors.extend(errors);

            if let (Some(first), true) = (first_error, self.options.fail_fast) {
                report.errors.push(
                    DwError::new(DwErrorKind::StageFailed)
                        .with_op("pipeline_run")
                        .with_stage(name)
                        .with_message("stopping pipeline after stage errors")
                        .with_source(first),
                );
                break;
            }
        }

        report
    }
}
