//! Result types for block reconstruction.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One addressed table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// 1-based row index.
    pub row: u32,
    /// 1-based column index.
    pub col: u32,
    pub text: String,
}

impl TableCell {
    pub fn new(row: u32, col: u32, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: text.into(),
        }
    }
}

/// Structured content reconstructed from one analysis response.
///
/// This is the sole artifact of the reconstruction step. Serialized field
/// names are `text_lines`, `form_fields` and `table_cells`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Text of every LINE block, in document order.
    pub text_lines: Vec<String>,
    /// Form key text to value text, in first-seen key order.
    pub form_fields: IndexMap<String, String>,
    /// Table cells in block-list order (not sorted).
    pub table_cells: Vec<TableCell>,
}

impl ExtractionResult {
    /// Composes the three reconstructions.
    pub fn new(
        text_lines: Vec<String>,
        form_fields: IndexMap<String, String>,
        table_cells: Vec<TableCell>,
    ) -> Self {
        Self {
            text_lines,
            form_fields,
            table_cells,
        }
    }

    /// Whether nothing at all was reconstructed.
    pub fn is_empty(&self) -> bool {
        self.text_lines.is_empty() && self.form_fields.is_empty() && self.table_cells.is_empty()
    }

    /// Groups cells into rows sorted by row then column.
    ///
    /// Cells from several tables on one page share the same index space, so
    /// this is a convenience for display rather than a table model.
    pub fn rows(&self) -> Vec<(u32, Vec<&TableCell>)> {
        let mut grid: BTreeMap<u32, Vec<&TableCell>> = BTreeMap::new();
        for cell in &self.table_cells {
            grid.entry(cell.row).or_default().push(cell);
        }
        grid.into_iter()
            .map(|(row, mut cells)| {
                cells.sort_by_key(|cell| cell.col);
                (row, cells)
            })
            .collect()
    }
}

impl fmt::Display for ExtractionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Text lines: {}", self.text_lines.len())?;
        for (idx, line) in self.text_lines.iter().enumerate() {
            writeln!(f, "  [{}] {}", idx + 1, line)?;
        }

        writeln!(f, "Form fields: {}", self.form_fields.len())?;
        for (key, value) in &self.form_fields {
            writeln!(f, "  {key} -> '{value}'")?;
        }

        writeln!(f, "Table cells: {}", self.table_cells.len())?;
        for (row, cells) in self.rows() {
            write!(f, "  Row {row}:")?;
            for cell in cells {
                write!(f, " [{}] '{}'", cell.col, cell.text)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
