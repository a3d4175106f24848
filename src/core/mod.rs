//! Core module - fundamental types and utilities

pub mod config;
pub mod field;
pub mod project;
pub mod snapshot;

pub use config::Config;
pub use field::{ChoiceSource, FieldDescriptor, WidgetKind};
pub use project::{Project, ProjectError};
pub use snapshot::{FormSnapshot, Record};
