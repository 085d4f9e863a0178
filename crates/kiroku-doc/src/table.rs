//! Table cell editing.
//!
//! Tables are a rectangular `rows[r][c]` matrix on the block. Every operation
//! keeps them rectangular and never lets them drop below 1×1.

use kiroku_types::{Block, BlockKind};

use crate::{Document, Edit, EditError, Result};

impl Document {
    /// Append an empty row matching the current column count.
    pub fn add_row(&mut self, index: usize) -> Result<Edit> {
        let rows = table_rows(self, index, "add_row")?;
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        rows.push(vec![String::new(); width]);
        self.bump();
        Ok(Edit::changed())
    }

    /// Append an empty cell to every row.
    pub fn add_column(&mut self, index: usize) -> Result<Edit> {
        let rows = table_rows(self, index, "add_column")?;
        for row in rows.iter_mut() {
            row.push(String::new());
        }
        self.bump();
        Ok(Edit::changed())
    }

    /// Remove row `row`. The last remaining row cannot be removed.
    pub fn delete_row(&mut self, index: usize, row: usize) -> Result<Edit> {
        let rows = table_rows(self, index, "delete_row")?;
        if row >= rows.len() {
            return Err(EditError::CellOutOfRange {
                row,
                col: 0,
                rows: rows.len(),
                cols: rows.first().map(|r| r.len()).unwrap_or(0),
            });
        }
        if rows.len() == 1 {
            return Err(EditError::TableTooSmall("row"));
        }
        rows.remove(row);
        self.bump();
        Ok(Edit::changed())
    }

    /// Remove column `col` from every row. The last remaining column cannot
    /// be removed.
    pub fn delete_column(&mut self, index: usize, col: usize) -> Result<Edit> {
        let rows = table_rows(self, index, "delete_column")?;
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if col >= width {
            return Err(EditError::CellOutOfRange {
                row: 0,
                col,
                rows: rows.len(),
                cols: width,
            });
        }
        if width == 1 {
            return Err(EditError::TableTooSmall("column"));
        }
        for r in rows.iter_mut() {
            r.remove(col);
        }
        self.bump();
        Ok(Edit::changed())
    }

    /// Overwrite one cell.
    pub fn set_cell(&mut self, index: usize, row: usize, col: usize, value: &str) -> Result<Edit> {
        let rows = table_rows(self, index, "set_cell")?;
        let (height, width) = (rows.len(), rows.first().map(|r| r.len()).unwrap_or(0));
        let cell = rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(EditError::CellOutOfRange {
                row,
                col,
                rows: height,
                cols: width,
            })?;
        if cell.as_str() == value {
            return Ok(Edit::unchanged());
        }
        *cell = value.to_string();
        self.bump();
        Ok(Edit::changed())
    }
}

/// Rows of the table block at `index`, initializing them if a table somehow
/// lacks any.
fn table_rows<'a>(
    doc: &'a mut Document,
    index: usize,
    op: &'static str,
) -> Result<&'a mut Vec<Vec<String>>> {
    let block: &'a mut Block = doc.block_mut(index)?;
    if block.kind != BlockKind::Table {
        return Err(EditError::UnsupportedKind {
            op,
            kind: block.kind,
        });
    }
    block.init_kind_defaults();
    Ok(block.rows.get_or_insert_with(Vec::new))
}

// ============================================================================
// Tests
// ============================================================================
