//! AWS Textract document analysis client.

use super::{AnalysisResponse, DocumentAnalyzer};
use crate::core::config::AnalysisConfig;
use crate::core::errors::{AuditError, AuditResult};
use crate::domain::{Block, BlockType, EntityType, Relationship, RelationshipType};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types::{self as textract, Document, FeatureType};
use std::time::Duration;

/// Runs `AnalyzeDocument` with the FORMS and TABLES features.
///
/// Each call is a single attempt; the SDK's retry layer is disabled.
#[derive(Debug, Clone)]
pub struct TextractAnalyzer {
    client: aws_sdk_textract::Client,
}

impl TextractAnalyzer {
    /// Builds a client from the AWS default provider chain and `config`.
    pub async fn new(config: &AnalysisConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(config.timeout_secs))
                    .build(),
            );
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let sdk_config = loader.load().await;
        tracing::info!(
            region = ?sdk_config.region().map(|r| r.as_ref().to_string()),
            "textract client configured"
        );

        Self::from_client(aws_sdk_textract::Client::new(&sdk_config))
    }

    /// Wraps an already configured SDK client.
    pub fn from_client(client: aws_sdk_textract::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentAnalyzer for TextractAnalyzer {
    async fn analyze(&self, bytes: Vec<u8>) -> AuditResult<AnalysisResponse> {
        let output = self
            .client
            .analyze_document()
            .document(Document::builder().bytes(Blob::new(bytes)).build())
            .feature_types(FeatureType::Forms)
            .feature_types(FeatureType::Tables)
            .send()
            .await
            .map_err(|e| {
                let context = format!("AnalyzeDocument: {}", DisplayErrorContext(&e));
                AuditError::analysis(context, e)
            })?;

        Ok(AnalysisResponse {
            blocks: output
                .blocks
                .map(|blocks| blocks.into_iter().map(convert_block).collect()),
        })
    }
}

fn convert_block(block: textract::Block) -> Block {
    Block {
        id: block.id.unwrap_or_default(),
        block_type: block
            .block_type
            .as_ref()
            .map(|kind| BlockType::from(kind.as_str()))
            .unwrap_or_default(),
        text: block.text,
        entity_types: block
            .entity_types
            .unwrap_or_default()
            .iter()
            .map(|role| EntityType::from(role.as_str().to_string()))
            .collect(),
        relationships: block
            .relationships
            .unwrap_or_default()
            .into_iter()
            .map(convert_relationship)
            .collect(),
        row_index: block.row_index.and_then(|i| u32::try_from(i).ok()),
        column_index: block.column_index.and_then(|i| u32::try_from(i).ok()),
    }
}

fn convert_relationship(relationship: textract::Relationship) -> Relationship {
    Relationship {
        kind: relationship
            .r#type
            .as_ref()
            .map(|kind| RelationshipType::from(kind.as_str()))
            .unwrap_or_default(),
        ids: relationship.ids.unwrap_or_default(),
    }
}
