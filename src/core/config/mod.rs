//! Configuration management for the audit pipeline.
//!
//! This module provides the settings consumed by the upstream service clients.

pub mod analysis;
pub mod completion;

pub use analysis::AnalysisConfig;
pub use completion::CompletionConfig;
