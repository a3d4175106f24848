//! Supplemental pre-submit transform steps
//!
//! Each step is a small, self-contained transform over the raw submitted
//! data. They are registered ahead of / behind the cascade rebinds by
//! `FormPipeline::standard`; see that function for the ordering contract.

use crate::form::definition::FormDefinition;
use crate::form::pipeline::{FormStep, LifecycleStage, PipelineError, StepContext};

const PRE_SUBMIT_ONLY: &[LifecycleStage] = &[LifecycleStage::PreSubmit];

/// Raw toggle values are uncoerced strings; absent, empty, "0" and "false"
/// all count as off.
fn toggle_on(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "0" && v != "false")
}

struct SectionRule {
    toggle: String,
    fields: Vec<String>,
}

/// Drops the submitted values of sections whose toggle is off.
///
/// Precondition: the snapshot data holds the raw submission.
/// Postcondition: for every section with an off/absent toggle, none of the
/// section's field keys remain in the data.
pub struct SectionToggleStep {
    rules: Vec<SectionRule>,
}

impl SectionToggleStep {
    pub fn from_definition(definition: &FormDefinition) -> Self {
        let rules = definition
            .sections
            .iter()
            .map(|section| SectionRule {
                toggle: section.toggle.clone(),
                fields: definition.section_fields(&section.name),
            })
            .collect();
        Self { rules }
    }
}

impl FormStep for SectionToggleStep {
    fn name(&self) -> &str {
        "section-toggle"
    }

    fn stages(&self) -> &[LifecycleStage] {
        PRE_SUBMIT_ONLY
    }

    fn apply(&self, _: LifecycleStage, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        for rule in &self.rules {
            if toggle_on(ctx.snapshot.value_of(&rule.toggle)) {
                continue;
            }
            for field in &rule.fields {
                ctx.snapshot.unset_value(field);
            }
        }
        Ok(())
    }
}

/// Refills blank submitted values from the bound record for fields that opted
/// in (secrets that are not echoed back to the client).
///
/// Precondition: the snapshot data holds the raw submission.
/// Postcondition: every opted-in field that arrived blank carries its prior
/// record value, unless the whole submission is empty - an empty submission
/// is left for the discard step to judge.
pub struct PreserveOnBlankStep {
    fields: Vec<String>,
}

impl PreserveOnBlankStep {
    pub fn from_definition(definition: &FormDefinition) -> Self {
        let fields = definition
            .fields
            .iter()
            .filter(|f| f.preserve_on_blank)
            .map(|f| f.name.clone())
            .collect();
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FormStep for PreserveOnBlankStep {
    fn name(&self) -> &str {
        "preserve-on-blank"
    }

    fn stages(&self) -> &[LifecycleStage] {
        PRE_SUBMIT_ONLY
    }

    fn apply(&self, _: LifecycleStage, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        if ctx.snapshot.all_values_empty() {
            return Ok(());
        }

        for field in &self.fields {
            let blank = ctx.snapshot.value_of(field).map_or(true, str::is_empty);
            if !blank {
                continue;
            }
            let prior = ctx
                .snapshot
                .record()
                .get_nonempty(field)
                .map(str::to_string);
            if let Some(value) = prior {
                ctx.snapshot.set_value(field.clone(), value);
            }
        }
        Ok(())
    }
}

/// Marks an all-empty submission as discarding the bound record.
///
/// Precondition: runs last, over the final submitted data.
/// Postcondition: the snapshot's discard flag is set iff every remaining
/// value is empty.
pub struct DiscardEmptySubmissionStep;

impl DiscardEmptySubmissionStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiscardEmptySubmissionStep {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStep for DiscardEmptySubmissionStep {
    fn name(&self) -> &str {
        "discard-empty"
    }

    fn stages(&self) -> &[LifecycleStage] {
        PRE_SUBMIT_ONLY
    }

    fn apply(&self, _: LifecycleStage, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
        if ctx.snapshot.all_values_empty() {
            ctx.snapshot.mark_discarded();
        }
        Ok(())
    }
}
