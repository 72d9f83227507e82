//! Document-analysis boundary.
//!
//! The OCR service is a black box behind [`DocumentAnalyzer`]: it receives
//! the raw bytes of an uploaded image or PDF and returns the block graph.
//! [`TextractAnalyzer`] is the production implementation; tests substitute
//! in-process fakes.
//!
//! Calls are made once, without retries, and are not cancelled once issued.

pub mod document;
pub mod textract;

pub use document::{DocumentKind, is_pdf_bytes};
pub use textract::TextractAnalyzer;

use crate::core::errors::AuditResult;
use crate::domain::Block;
use crate::domain::block::skip_malformed;
use crate::extraction::{ExtractionResult, reconstruct_response};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Top-level shape of an analysis response.
///
/// `blocks` is `None` when the service answered without a block list, which
/// is distinct from an empty list. Entries that are not block objects are
/// dropped one by one; the rest of the list is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "Blocks", default, deserialize_with = "block_list")]
    pub blocks: Option<Vec<Block>>,
}

fn block_list<'de, D>(deserializer: D) -> Result<Option<Vec<Block>>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(Some(skip_malformed(items))),
        serde_json::Value::Null => Ok(None),
        other => {
            tracing::debug!(found = %other, "Blocks is not a list");
            Ok(None)
        }
    }
}

impl AnalysisResponse {
    /// Parses a saved response body (for example `aws textract analyze-document` output).
    pub fn from_json(bytes: &[u8]) -> AuditResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A service that turns document bytes into a block graph.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, bytes: Vec<u8>) -> AuditResult<AnalysisResponse>;
}

/// Thread-safe analyzer handle.
pub type SharedAnalyzer = Arc<dyn DocumentAnalyzer>;

/// Analyzes `bytes` and reconstructs the response.
///
/// Fails when the service call fails or returns no blocks.
pub async fn extract_document(
    analyzer: &dyn DocumentAnalyzer,
    bytes: Vec<u8>,
) -> AuditResult<ExtractionResult> {
    let kind = DocumentKind::detect(&bytes);
    if kind.is_supported() {
        tracing::debug!(kind = kind.label(), size = bytes.len(), "analyzing document");
    } else {
        tracing::warn!(
            kind = kind.label(),
            size = bytes.len(),
            "upload is not a recognized PDF or image, forwarding anyway"
        );
    }

    let start = Instant::now();
    let response = analyzer.analyze(bytes).await?;
    tracing::info!(
        blocks = response.blocks.as_ref().map_or(0, Vec::len),
        analysis_ms = start.elapsed().as_secs_f64() * 1000.0,
        "document analyzed"
    );

    reconstruct_response(response.blocks.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::AuditError;

    struct FixedAnalyzer(Option<AnalysisResponse>);

    #[async_trait]
    impl DocumentAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _bytes: Vec<u8>) -> AuditResult<AnalysisResponse> {
            self.0.clone().ok_or_else(|| {
                AuditError::analysis(
                    "service unavailable",
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
                )
            })
        }
    }

    #[test]
    fn test_parse_saved_response() {
        let body = br#"{
            "DocumentMetadata": {"Pages": 1},
            "Blocks": [
                {"BlockType": "PAGE", "Id": "p"},
                {"BlockType": "LINE", "Id": "l", "Text": "Receipt"}
            ],
            "AnalyzeDocumentModelVersion": "1.0"
        }"#;

        let response = AnalysisResponse::from_json(body).unwrap();
        assert_eq!(response.blocks.as_ref().map(Vec::len), Some(2));

        let missing = AnalysisResponse::from_json(br#"{"DocumentMetadata": {}}"#).unwrap();
        assert!(missing.blocks.is_none());
    }

    #[test]
    fn test_malformed_block_entries_are_dropped() {
        let body = br#"{"Blocks": [
            42,
            {"BlockType": "LINE", "Id": "l", "Text": "Receipt"},
            "LINE",
            null
        ]}"#;

        let response = AnalysisResponse::from_json(body).unwrap();
        let blocks = response.blocks.unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text.as_deref(), Some("Receipt"));

        let result = reconstruct_response(Some(blocks.as_slice())).unwrap();
        assert_eq!(result.text_lines, vec!["Receipt"]);
    }

    #[test]
    fn test_non_list_blocks_is_missing() {
        let response = AnalysisResponse::from_json(br#"{"Blocks": {"Id": "l"}}"#).unwrap();
        assert!(response.blocks.is_none());
    }

    #[tokio::test]
    async fn test_extract_document_reconstructs() {
        let analyzer = FixedAnalyzer(Some(AnalysisResponse {
            blocks: Some(vec![
                Block::new("l", crate::domain::BlockType::Line).with_text("Receipt"),
            ]),
        }));

        let result = extract_document(&analyzer, b"%PDF-1.4".to_vec()).await.unwrap();
        assert_eq!(result.text_lines, vec!["Receipt"]);
    }

    #[tokio::test]
    async fn test_missing_blocks_is_fatal() {
        let analyzer = FixedAnalyzer(Some(AnalysisResponse { blocks: None }));
        let err = extract_document(&analyzer, b"%PDF-1.4".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::MissingBlocks));

        let analyzer = FixedAnalyzer(Some(AnalysisResponse {
            blocks: Some(Vec::new()),
        }));
        let err = extract_document(&analyzer, b"%PDF-1.4".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::MissingBlocks));
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let analyzer = FixedAnalyzer(None);
        let err = extract_document(&analyzer, vec![0u8; 16]).await.unwrap_err();
        assert!(matches!(err, AuditError::Analysis { .. }));
    }
}
