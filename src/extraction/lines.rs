//! Line text extraction.

use crate::domain::{Block, BlockType};

/// Returns the text of every `LINE` block in document order.
///
/// A `LINE` block without text contributes an empty string.
pub fn extract_lines(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .filter(|block| block.block_type == BlockType::Line)
        .map(|line| line.text.clone().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_lines_in_order() {
        let blocks = vec![
            Block::new("p", BlockType::Page),
            Block::new("l1", BlockType::Line).with_text("ACME Corp"),
            Block::new("w", BlockType::Word).with_text("ACME"),
            Block::new("l2", BlockType::Line).with_text("Invoice #1021"),
            Block::new("x", BlockType::Unknown("LAYOUT_TEXT".to_string())).with_text("skip"),
        ];

        assert_eq!(extract_lines(&blocks), vec!["ACME Corp", "Invoice #1021"]);
    }

    #[test]
    fn test_textless_line_is_empty_string() {
        let blocks = vec![Block::new("l", BlockType::Line)];
        assert_eq!(extract_lines(&blocks), vec![String::new()]);
    }
}
