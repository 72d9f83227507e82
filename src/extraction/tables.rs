//! Table cell reconstruction.

use super::result::TableCell;
use super::text::TextResolver;
use crate::domain::{Block, BlockType, RelationshipType};

/// Emits one [`TableCell`] per `CELL` block, in block-list order.
///
/// Cells are never dropped. A cell without a `CHILD` relationship is blank;
/// a cell missing its row or column index is placed at index 0. When a cell
/// carries several `CHILD` entries, the last one supplies the text.
pub fn reconstruct_table_cells(
    blocks: &[Block],
    resolver: &TextResolver<'_, '_>,
) -> Vec<TableCell> {
    blocks
        .iter()
        .filter(|block| block.block_type == BlockType::Cell)
        .map(|cell| {
            let text = cell
                .relationships
                .iter()
                .rfind(|rel| rel.kind == RelationshipType::Child)
                .map(|rel| resolver.resolve(&rel.ids))
                .unwrap_or_default();

            if cell.row_index.is_none() || cell.column_index.is_none() {
                tracing::debug!(id = %cell.id, "cell without row/column index");
            }

            TableCell {
                row: cell.row_index.unwrap_or_default(),
                col: cell.column_index.unwrap_or_default(),
                text,
            }
        })
        .collect()
}
