//! Document-analysis service configuration.

use serde::{Deserialize, Serialize};

/// Settings for the upstream document-analysis (OCR) service.
///
/// Credentials are not part of this struct; they are resolved by the AWS
/// default provider chain (environment, profile, instance metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// AWS region hosting the analysis endpoint.
    /// If None, the region is taken from the environment (`AWS_REGION`).
    #[serde(default)]
    pub region: Option<String>,

    /// Upper bound for a single analysis call, in seconds.
    /// Default: 60
    #[serde(default = "AnalysisConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AnalysisConfig {
    /// Create a new AnalysisConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AWS region.
    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn default_timeout_secs() -> u64 {
        60
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            region: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}
