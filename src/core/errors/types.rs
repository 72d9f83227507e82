//! Core error types for the audit pipeline.
//!
//! This module defines the error taxonomy shared by every stage of the system:
//! the document-analysis call, block reconstruction, structured file conversion,
//! request validation and the language-model completion step.
//!
//! Structural anomalies inside a block graph are not represented
//! here; reconstruction recovers from them locally. Only conditions that make a
//! whole request fail reach this type.

use thiserror::Error;

/// Enum representing the stages of the audit pipeline.
///
/// Used to identify where a failure originated when it is logged or surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Sending a document to the analysis service.
    DocumentAnalysis,
    /// Rebuilding lines, form fields and table cells from blocks.
    Reconstruction,
    /// Converting CSV, Excel or XML uploads.
    Conversion,
    /// Checking an incoming request before any work is done.
    RequestValidation,
    /// Requesting a completion from the language model.
    Completion,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::DocumentAnalysis => write!(f, "document analysis"),
            ProcessingStage::Reconstruction => write!(f, "reconstruction"),
            ProcessingStage::Conversion => write!(f, "conversion"),
            ProcessingStage::RequestValidation => write!(f, "request validation"),
            ProcessingStage::Completion => write!(f, "completion"),
        }
    }
}

/// Errors that can occur anywhere in the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The document-analysis service could not be reached or rejected the request.
    #[error("document analysis failed: {context}")]
    Analysis {
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The analysis response carried no usable block list.
    #[error("analysis response contained no blocks")]
    MissingBlocks,

    /// A structured file could not be parsed.
    #[error("{format} conversion failed: {context}")]
    Conversion {
        /// The file format being converted (csv, excel, xml).
        format: &'static str,
        /// Additional context about the failure.
        context: String,
        /// The underlying parser error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The uploaded file has an extension no converter handles.
    #[error("unsupported structured file type: '{file_name}'")]
    UnsupportedFormat {
        /// The offending file name.
        file_name: String,
    },

    /// The completion service could not be reached or returned an error.
    #[error("completion request failed: {context}")]
    Completion {
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The completion service answered without any message content.
    #[error("completion response contained no content")]
    EmptyCompletion,

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type AuditResult<T> = Result<T, AuditError>;

impl AuditError {
    /// Wraps a failure of the document-analysis service.
    pub fn analysis(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Analysis {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a failure of a structured file parser.
    pub fn conversion(
        format: &'static str,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Conversion {
            format,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a failure of the completion service.
    pub fn completion(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Completion {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a configuration error for a missing required setting.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use doc_audit::core::errors::AuditError;
    /// let err = AuditError::missing_setting("api_key", "completion config");
    /// assert!(matches!(err, AuditError::Config { .. }));
    /// ```
    pub fn missing_setting(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: format!(
                "missing required setting '{}' in {}",
                field.into(),
                context.into()
            ),
        }
    }

    /// The pipeline stage this error belongs to, if it maps to one.
    pub fn stage(&self) -> Option<ProcessingStage> {
        match self {
            Self::Analysis { .. } => Some(ProcessingStage::DocumentAnalysis),
            Self::MissingBlocks => Some(ProcessingStage::Reconstruction),
            Self::Conversion { .. } | Self::UnsupportedFormat { .. } => {
                Some(ProcessingStage::Conversion)
            }
            Self::Completion { .. } | Self::EmptyCompletion => Some(ProcessingStage::Completion),
            Self::InvalidInput { .. } => Some(ProcessingStage::RequestValidation),
            Self::Config { .. } | Self::Io(_) | Self::Json(_) => None,
        }
    }

    /// Whether the caller, rather than an upstream service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::InvalidInput { .. }
        )
    }
}
