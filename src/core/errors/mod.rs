//! Error handling for the audit pipeline.

mod types;

pub use types::{AuditError, AuditResult, ProcessingStage};
