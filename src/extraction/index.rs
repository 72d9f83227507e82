//! Id lookup over a block list.

use crate::domain::Block;
use std::collections::HashMap;

/// Maps block ids to the blocks of one analysis response.
///
/// The index borrows the response; it lives exactly as long as the
/// reconstruction of a single document.
#[derive(Debug, Default)]
pub struct BlockIndex<'a> {
    blocks: HashMap<&'a str, &'a Block>,
}

impl<'a> BlockIndex<'a> {
    /// Indexes `blocks` by id.
    ///
    /// Ids are unique in a well-formed response. If one repeats anyway, the
    /// later block replaces the earlier one.
    pub fn new(blocks: &'a [Block]) -> Self {
        let mut index = HashMap::with_capacity(blocks.len());
        for block in blocks {
            if index.insert(block.id.as_str(), block).is_some() {
                tracing::debug!(id = %block.id, "duplicate block id, keeping the later block");
            }
        }
        Self { blocks: index }
    }

    /// Looks up a block. Dangling ids yield `None`.
    pub fn get(&self, id: &str) -> Option<&'a Block> {
        self.blocks.get(id).copied()
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the index holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlockType;

    #[test]
    fn test_lookup_by_id() {
        let blocks = vec![
            Block::new("w-1", BlockType::Word).with_text("Total"),
            Block::new("l-1", BlockType::Line).with_text("Total due"),
        ];
        let index = BlockIndex::new(&blocks);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("w-1").and_then(|b| b.text.as_deref()), Some("Total"));
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_id_keeps_later_block() {
        let blocks = vec![
            Block::new("dup", BlockType::Word).with_text("first"),
            Block::new("dup", BlockType::Word).with_text("second"),
        ];
        let index = BlockIndex::new(&blocks);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("dup").and_then(|b| b.text.as_deref()), Some("second"));
    }

    #[test]
    fn test_empty_list() {
        let index = BlockIndex::new(&[]);
        assert!(index.is_empty());
    }
}
