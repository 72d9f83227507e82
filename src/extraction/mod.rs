//! Reconstruction of structured content from a block graph.
//!
//! The document-analysis service returns a flat list of blocks that reference
//! each other by id. This module turns that list into three structures:
//!
//! - text lines, from `LINE` blocks ([`extract_lines`])
//! - form fields, from `KEY_VALUE_SET` blocks ([`reconstruct_form_fields`])
//! - table cells, from `CELL` blocks ([`reconstruct_table_cells`])
//!
//! Every step reads the blocks through one [`BlockIndex`] and resolves text
//! through one [`TextResolver`]. Reconstruction is synchronous and never
//! fails: anomalies in individual blocks degrade to empty values. The only
//! fatal condition, a response without blocks, is reported by
//! [`reconstruct_response`].
//!
//! # Example
//!
//! ```rust
//! use doc_audit::domain::{Block, BlockType};
//! use doc_audit::extraction::reconstruct;
//!
//! let blocks = vec![Block::new("l1", BlockType::Line).with_text("Invoice #1021")];
//! let result = reconstruct(&blocks);
//! assert_eq!(result.text_lines, vec!["Invoice #1021"]);
//! assert!(result.form_fields.is_empty());
//! ```

pub mod forms;
pub mod index;
pub mod lines;
pub mod result;
pub mod tables;
pub mod text;

pub use forms::reconstruct_form_fields;
pub use index::BlockIndex;
pub use lines::extract_lines;
pub use result::{ExtractionResult, TableCell};
pub use tables::reconstruct_table_cells;
pub use text::TextResolver;

use crate::core::errors::{AuditError, AuditResult};
use crate::domain::Block;

/// Reconstructs lines, form fields and table cells from `blocks`.
pub fn reconstruct(blocks: &[Block]) -> ExtractionResult {
    let index = BlockIndex::new(blocks);
    let resolver = TextResolver::new(&index);

    let result = ExtractionResult::new(
        extract_lines(blocks),
        reconstruct_form_fields(blocks, &resolver),
        reconstruct_table_cells(blocks, &resolver),
    );

    tracing::debug!(
        blocks = blocks.len(),
        lines = result.text_lines.len(),
        fields = result.form_fields.len(),
        cells = result.table_cells.len(),
        "reconstructed document"
    );
    result
}

/// Reconstructs a whole analysis response.
///
/// An absent or empty block list means the service produced nothing usable
/// and yields [`AuditError::MissingBlocks`], which callers can tell apart from
/// a successful result whose sections happen to be empty.
pub fn reconstruct_response(blocks: Option<&[Block]>) -> AuditResult<ExtractionResult> {
    match blocks {
        Some(blocks) if !blocks.is_empty() => Ok(reconstruct(blocks)),
        _ => Err(AuditError::MissingBlocks),
    }
}
