//! Domain types shared across the pipeline.
//!
//! - [`block`] models the graph-encoded output of the document-analysis service.
//! - [`document`] models the extracts submitted to the audit step.

pub mod block;
pub mod document;

pub use block::{Block, BlockType, EntityType, Relationship, RelationshipType};
pub use document::AuditDocument;
