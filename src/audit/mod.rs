//! Language-model audit step.
//!
//! Extracted and converted documents are flattened into a single prompt
//! ([`prompt`]) and sent to a [`CompletionService`], which returns a Markdown
//! audit report.

pub mod completion;
pub mod prompt;

pub use completion::{CompletionRequest, CompletionService, OpenAiClient, SharedCompletion};
pub use prompt::{SYSTEM_PROMPT, build_prompt, format_document};

use crate::core::errors::{AuditError, AuditResult};
use crate::domain::AuditDocument;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Narrative report produced by the audit step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub summary: String,
}

/// Parses an audit request body, which must be a JSON array of documents.
pub fn parse_documents(body: serde_json::Value) -> AuditResult<Vec<AuditDocument>> {
    if !body.is_array() {
        return Err(AuditError::InvalidInput {
            message: "Expected a list of documents".to_string(),
        });
    }
    Ok(serde_json::from_value(body)?)
}

/// Runs documents through the completion service.
pub struct Auditor {
    completion: SharedCompletion,
}

impl Auditor {
    pub fn new(completion: SharedCompletion) -> Self {
        Self { completion }
    }

    /// Produces an audit report covering every document in one request.
    pub async fn audit(&self, documents: &[AuditDocument]) -> AuditResult<AuditSummary> {
        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: build_prompt(documents),
        };
        tracing::debug!(
            documents = documents.len(),
            prompt_chars = request.user.len(),
            "requesting audit"
        );

        let start = Instant::now();
        let summary = self.completion.complete(&request).await?;
        tracing::info!(
            documents = documents.len(),
            summary_chars = summary.len(),
            completion_ms = start.elapsed().as_secs_f64() * 1000.0,
            "audit completed"
        );

        Ok(AuditSummary { summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingCompletion {
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionService for RecordingCompletion {
        async fn complete(&self, request: &CompletionRequest) -> AuditResult<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok("## invoice.pdf\n- Totals reconcile.".to_string())
        }
    }

    #[test]
    fn test_parse_documents_requires_array() {
        let err = parse_documents(serde_json::json!({"fileName": "a.pdf"})).unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput { .. }));
        assert!(err.is_client_error());

        let docs = parse_documents(serde_json::json!([{"fileName": "a.pdf"}])).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "a.pdf");
    }

    #[tokio::test]
    async fn test_audit_sends_system_and_prompt() {
        let completion = Arc::new(RecordingCompletion::default());
        let auditor = Auditor::new(completion.clone());

        let docs = vec![AuditDocument::from_structured(
            "invoice.pdf",
            serde_json::json!([{"total": 450}]),
        )];
        let summary = auditor.audit(&docs).await.unwrap();
        assert_eq!(summary.summary, "## invoice.pdf\n- Totals reconcile.");

        let seen = completion.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system, SYSTEM_PROMPT);
        assert!(seen[0].user.contains("FILE: invoice.pdf"));
        assert!(seen[0].user.ends_with("Audit Summary:"));
    }
}
