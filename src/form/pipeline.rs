//! The form lifecycle pipeline
//!
//! Transform steps run in declaration order over one snapshot, at two
//! lifecycle points. The order is fixed when the pipeline is built; there is
//! no priority registry, and a step sees exactly the state its predecessors
//! left behind. Every step is idempotent within its stage: running a stage
//! twice in a row yields the same snapshot as running it once.

use std::fmt;
use thiserror::Error;

use crate::catalog::store::{CatalogError, CatalogStore};
use crate::core::snapshot::FormSnapshot;
use crate::form::definition::FormDefinition;
use crate::form::rebind::CascadeRebindStep;
use crate::form::steps::{DiscardEmptySubmissionStep, PreserveOnBlankStep, SectionToggleStep};

/// The two lifecycle points the pipeline runs at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    /// Form initialized from a bound record (or empty)
    PrePopulate,

    /// Raw submission received, before type coercion and validation
    PreSubmit,
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStage::PrePopulate => write!(f, "pre-populate"),
            LifecycleStage::PreSubmit => write!(f, "pre-submit"),
        }
    }
}

/// Errors surfaced by pipeline execution
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// State handed to each step
pub struct StepContext<'a> {
    pub snapshot: &'a mut FormSnapshot,
    pub store: &'a dyn CatalogStore,
}

/// One named transform over the snapshot
pub trait FormStep {
    /// Stable name used in logs
    fn name(&self) -> &str;

    /// The stages this step participates in
    fn stages(&self) -> &[LifecycleStage];

    /// Apply the transform. Must be idempotent for a given stage and input.
    fn apply(&self, stage: LifecycleStage, ctx: &mut StepContext<'_>) -> Result<(), PipelineError>;
}

/// An ordered pipeline of steps
#[derive(Default)]
pub struct FormPipeline {
    steps: Vec<Box<dyn FormStep>>,
}

impl FormPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn with_step(mut self, step: impl FormStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// The canonical pipeline for a form definition.
    ///
    /// Pre-submit order matters: section gating first (so gated values are
    /// gone before anything reasons about them), then blank-field
    /// preservation, then the cascade rebinds, then the empty-submission
    /// check last, over the final data.
    pub fn standard(definition: &FormDefinition) -> Self {
        let mut pipeline = Self::new();

        if !definition.sections.is_empty() {
            pipeline = pipeline.with_step(SectionToggleStep::from_definition(definition));
        }

        let preserve = PreserveOnBlankStep::from_definition(definition);
        if !preserve.is_empty() {
            pipeline = pipeline.with_step(preserve);
        }

        for cascade in &definition.cascades {
            pipeline = pipeline.with_step(CascadeRebindStep::new(cascade));
        }

        if definition.discard_when_empty {
            pipeline = pipeline.with_step(DiscardEmptySubmissionStep::new());
        }

        pipeline
    }

    /// Names of the registered steps, in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run all steps registered for the stage, in order
    pub fn run(
        &self,
        stage: LifecycleStage,
        snapshot: &mut FormSnapshot,
        store: &dyn CatalogStore,
    ) -> Result<(), PipelineError> {
        let span = tracing::debug_span!("pipeline", stage = %stage);
        let _guard = span.enter();

        let mut ctx = StepContext { snapshot, store };
        for step in &self.steps {
            if step.stages().contains(&stage) {
                tracing::debug!(step = step.name(), "applying step");
                step.apply(stage, &mut ctx)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_form() -> FormDefinition {
        serde_yml::from_str(
            r#"
name: mail-settings
fields:
  - name: use_imap
    widget: checkbox
  - name: imap_host
    widget: text
    section: imap
  - name: password
    widget: password
    preserve_on_blank: true
  - name: country
    widget: select
  - name: region_text
    widget: text
sections:
  - name: imap
    toggle: use_imap
cascades:
  - parent: country
    field: region
    fallback: region_text
discard_when_empty: true
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_standard_pipeline_order() {
        let pipeline = FormPipeline::standard(&mail_form());
        insta::assert_snapshot!(
            pipeline.step_names().join(" > "),
            @"section-toggle > preserve-on-blank > cascade:region > discard-empty"
        );
    }

    #[test]
    fn test_steps_filtered_by_stage() {
        let form = mail_form();
        let pipeline = FormPipeline::standard(&form);
        let store = crate::catalog::store::InMemoryCatalog::new();
        let mut snapshot = form.snapshot();

        // no record bound, empty data: both stages are no-ops but must run
        pipeline
            .run(LifecycleStage::PrePopulate, &mut snapshot, &store)
            .unwrap();
        pipeline
            .run(LifecycleStage::PreSubmit, &mut snapshot, &store)
            .unwrap();
    }
}
