//! Configuration types for the audit server and CLI.

use doc_audit::core::config::{AnalysisConfig, CompletionConfig};
use std::path::PathBuf;

/// Default upload limit, matching the synchronous Textract document limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub analysis: AnalysisConfig,
    pub completion: CompletionConfig,
    pub host: String,
    pub port: u16,
    /// Directory holding the built single-page frontend.
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}
