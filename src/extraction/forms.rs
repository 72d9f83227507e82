//! Key-value form field reconstruction.
//!
//! A form field is encoded as a KEY-role `KEY_VALUE_SET` block whose first
//! relationship entry lists the words of the key, and whose `VALUE`
//! relationships point at VALUE-role blocks. The value text is always reached
//! through the key's `VALUE` edges; VALUE-role blocks are never read directly.

use super::index::BlockIndex;
use super::text::TextResolver;
use crate::domain::{Block, BlockType, RelationshipType};
use indexmap::IndexMap;

/// Rebuilds `key text -> value text` pairs from `KEY_VALUE_SET` blocks.
///
/// Keys that resolve to empty text are dropped. When two key blocks resolve
/// to the same text, the later one in list order wins; the entry keeps the
/// position of its first occurrence.
pub fn reconstruct_form_fields(
    blocks: &[Block],
    resolver: &TextResolver<'_, '_>,
) -> IndexMap<String, String> {
    let (key_blocks, value_blocks): (Vec<&Block>, Vec<&Block>) = blocks
        .iter()
        .filter(|block| block.block_type == BlockType::KeyValueSet)
        .partition(|block| block.is_key());

    tracing::debug!(
        keys = key_blocks.len(),
        values = value_blocks.len(),
        "partitioned key-value blocks"
    );

    let mut fields = IndexMap::with_capacity(key_blocks.len());
    for key_block in key_blocks {
        let Some(key_text) = key_text(key_block, resolver) else {
            continue;
        };
        let value_text = resolver.resolve(key_block.related_ids(&RelationshipType::Value));

        if let Some(previous) = fields.insert(key_text, value_text) {
            tracing::debug!(id = %key_block.id, %previous, "duplicate form key overwritten");
        }
    }
    fields
}

/// Resolves the display text of a key block from its first relationship entry.
///
/// Returns `None` for keys without relationships or whose text is empty.
fn key_text(key_block: &Block, resolver: &TextResolver<'_, '_>) -> Option<String> {
    let first = key_block.relationships.first()?;
    if first.kind == RelationshipType::Value {
        // The service lists a key's own words first; a VALUE entry here means
        // the key text below is built from value ids.
        tracing::warn!(
            id = %key_block.id,
            "key block's first relationship is VALUE, key text may be misresolved"
        );
    }

    let text = resolver.resolve(&first.ids);
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityType, Relationship};

    fn word(id: &str, text: &str) -> Block {
        Block::new(id, BlockType::Word).with_text(text)
    }

    fn key(id: &str, own: &[&str], values: &[&str]) -> Block {
        let mut block = Block::new(id, BlockType::KeyValueSet).with_entity_type(EntityType::Key);
        if !own.is_empty() {
            block = block.with_relationship(Relationship::new(
                RelationshipType::Child,
                own.iter().copied(),
            ));
        }
        if !values.is_empty() {
            block = block.with_relationship(Relationship::new(
                RelationshipType::Value,
                values.iter().copied(),
            ));
        }
        block
    }

    fn run(blocks: &[Block]) -> IndexMap<String, String> {
        let index = BlockIndex::new(blocks);
        let resolver = TextResolver::new(&index);
        reconstruct_form_fields(blocks, &resolver)
    }

    #[test]
    fn test_pairs_key_with_value() {
        let blocks = vec![
            key("k1", &["w1", "w2"], &["v1"]),
            word("w1", "Invoice"),
            word("w2", "Date:"),
            word("v1", "2024-03-01"),
        ];

        let fields = run(&blocks);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("Invoice Date:").map(String::as_str), Some("2024-03-01"));
    }

    #[test]
    fn test_no_key_value_blocks_yields_empty_mapping() {
        let blocks = vec![
            Block::new("l", BlockType::Line).with_text("Hello"),
            word("w", "Hello"),
        ];
        assert!(run(&blocks).is_empty());
    }

    #[test]
    fn test_key_without_relationships_is_dropped() {
        let blocks = vec![
            Block::new("k", BlockType::KeyValueSet).with_entity_type(EntityType::Key),
            key("k2", &["w"], &[]),
            word("w", "Notes:"),
        ];

        let fields = run(&blocks);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("Notes:").map(String::as_str), Some(""));
    }

    #[test]
    fn test_key_with_empty_text_is_dropped() {
        let blocks = vec![key("k", &["missing"], &["v"]), word("v", "orphan")];
        assert!(run(&blocks).is_empty());
    }

    #[test]
    fn test_multiple_value_fragments_concatenate_in_order() {
        let blocks = vec![
            Block::new("k", BlockType::KeyValueSet)
                .with_entity_type(EntityType::Key)
                .with_relationship(Relationship::new(RelationshipType::Child, ["kw"]))
                .with_relationship(Relationship::new(RelationshipType::Value, ["v1", "v2"]))
                .with_relationship(Relationship::new(RelationshipType::Value, ["v3"])),
            word("kw", "Address:"),
            word("v1", "12"),
            word("v2", "Harbour"),
            word("v3", "Road"),
        ];

        let fields = run(&blocks);
        assert_eq!(fields.get("Address:").map(String::as_str), Some("12 Harbour Road"));
    }

    #[test]
    fn test_duplicate_key_text_last_write_wins() {
        let blocks = vec![
            key("k1", &["a"], &["v1"]),
            key("k2", &["b"], &["v2"]),
            word("a", "Total:"),
            word("b", "Total:"),
            word("v1", "$100.00"),
            word("v2", "$120.00"),
        ];

        let fields = run(&blocks);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("Total:").map(String::as_str), Some("$120.00"));
    }

    #[test]
    fn test_value_blocks_are_not_read_directly() {
        // A VALUE-role block carrying text of its own must not leak into the
        // mapping; only the key's VALUE edge targets count.
        let blocks = vec![
            key("k", &["kw"], &["vw"]),
            Block::new("vb", BlockType::KeyValueSet)
                .with_entity_type(EntityType::Value)
                .with_text("ignored"),
            word("kw", "Ref:"),
            word("vw", "A-77"),
        ];

        let fields = run(&blocks);
        assert_eq!(fields.get("Ref:").map(String::as_str), Some("A-77"));
    }

    #[test]
    fn test_first_relationship_value_kind_still_resolves() {
        let blocks = vec![
            Block::new("k", BlockType::KeyValueSet)
                .with_entity_type(EntityType::Key)
                .with_relationship(Relationship::new(RelationshipType::Value, ["v"])),
            word("v", "42"),
        ];

        let fields = run(&blocks);
        assert_eq!(fields.get("42").map(String::as_str), Some("42"));
    }
}
