//! Command implementations

pub mod catalog;
pub mod completions;
pub mod form;
pub mod init;
pub mod submit;
pub mod validate;
