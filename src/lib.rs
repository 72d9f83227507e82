//! # doc-audit
//!
//! Document extraction and audit pipeline built around AWS Textract.
//!
//! Uploaded scans and PDFs are sent to a document-analysis service, whose
//! response is a flat list of [`domain::Block`]s linked by id. The
//! [`extraction`] module rebuilds that graph into reading-order text lines,
//! key/value form fields and positioned table cells. Spreadsheets and XML
//! exports take the [`convert`] path instead. Either result can then be handed
//! to the [`audit`] step, which asks a language model for a Markdown audit
//! report.
//!
//! ## Modules
//!
//! * [`core`] - errors and configuration
//! * [`domain`] - block graph and audit request documents
//! * [`extraction`] - block graph reconstruction
//! * [`analysis`] - document-analysis service boundary
//! * [`convert`] - CSV, Excel and XML conversion
//! * [`audit`] - prompt building and completion clients
//! * [`utils`] - logging setup
//!
//! ## Example
//!
//! ```rust
//! use doc_audit::domain::{Block, BlockType};
//! use doc_audit::extraction::reconstruct;
//!
//! let blocks = vec![
//!     Block::new("l1", BlockType::Line).with_text("Invoice #1021"),
//!     Block::new("l2", BlockType::Line).with_text("ACME Corp"),
//! ];
//! let result = reconstruct(&blocks);
//! assert_eq!(result.text_lines, vec!["Invoice #1021", "ACME Corp"]);
//! ```

pub mod analysis;
pub mod audit;
pub mod convert;
pub mod core;
pub mod domain;
pub mod extraction;
pub mod utils;
