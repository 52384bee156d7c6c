//! Report definition types.

pub mod report;

pub use report::{DefinitionError, Report, ResultKind};
