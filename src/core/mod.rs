//! The core module of the audit pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration types for the upstream services
//! - Error handling
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;

pub use config::{AnalysisConfig, CompletionConfig};
pub use errors::{AuditError, AuditResult, ProcessingStage};
