//! Form module - definitions, policy resolution, and the lifecycle pipeline

pub mod definition;
pub mod pipeline;
pub mod rebind;
pub mod resolver;
pub mod steps;

pub use definition::{CascadeDef, DefinitionError, FieldDef, FormDefinition, SectionDef};
pub use pipeline::{FormPipeline, FormStep, LifecycleStage, PipelineError, StepContext};
pub use rebind::CascadeRebindStep;
pub use resolver::{resolve, DependentFieldPolicy};
pub use steps::{DiscardEmptySubmissionStep, PreserveOnBlankStep, SectionToggleStep};
