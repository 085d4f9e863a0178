//! The ordered block list and its structural invariants.
//!
//! A `Document` is a plain `Vec<Block>`: sequence order is reading order and
//! every block is addressed by its current index. Three things hold after
//! every public operation:
//!
//! - there is at least one block
//! - block ids are unique
//! - indent is within `0..=MAX_INDENT` and table rows are rectangular
//!
//! Edits live in [`crate::edit`] and [`crate::table`]; this module owns
//! construction, lookup, and the derived numbering.

use std::collections::HashSet;

use kiroku_types::{Block, BlockId, BlockKind, MAX_INDENT};

use crate::{EditError, Result};

/// An ordered, never-empty list of blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
    /// Incremented on every change that reaches the block list.
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::text("")],
            version: 0,
        }
    }

    /// Build a document from loaded blocks, repairing anything that would
    /// break the invariants.
    ///
    /// Duplicate ids are re-minted, indents clamped, and ragged tables padded.
    /// An empty list becomes a single empty paragraph.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut seen = HashSet::with_capacity(blocks.len());
        let mut repaired = Vec::with_capacity(blocks.len());

        for mut block in blocks {
            if !seen.insert(block.id) {
                let fresh = BlockId::new();
                tracing::warn!("duplicate block id {} re-minted as {}", block.id.short(), fresh.short());
                block.id = fresh;
                seen.insert(fresh);
            }
            if block.indent > MAX_INDENT {
                tracing::warn!("block {} indent {} clamped to {}", block.id.short(), block.indent, MAX_INDENT);
                block.indent = MAX_INDENT;
            }
            if block.kind == BlockKind::Table {
                normalize_table(&mut block);
            }
            repaired.push(block);
        }

        let mut doc = Self {
            blocks: repaired,
            version: 0,
        };
        doc.ensure_non_empty();
        doc
    }

    /// Current version (incremented on each change).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Blocks in reading order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Number of blocks (always at least 1).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn find(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Append one empty paragraph if the document has no blocks.
    ///
    /// Returns the id of the inserted block, if any.
    pub fn ensure_non_empty(&mut self) -> Option<BlockId> {
        if !self.blocks.is_empty() {
            return None;
        }
        let block = Block::text("");
        let id = block.id;
        self.blocks.push(block);
        Some(id)
    }

    /// Display ordinal for every block.
    ///
    /// Consecutive numbered blocks count 1, 2, 3...; any other kind resets
    /// the run and gets `None`. Indent does not affect the count.
    pub fn ordinals(&self) -> Vec<Option<usize>> {
        let mut counter = 0;
        self.blocks
            .iter()
            .map(|block| {
                if block.kind == BlockKind::Numbered {
                    counter += 1;
                    Some(counter)
                } else {
                    counter = 0;
                    None
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Crate-internal mutation primitives
    // ------------------------------------------------------------------

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index < self.blocks.len() {
            Ok(())
        } else {
            Err(EditError::IndexOutOfRange {
                index,
                len: self.blocks.len(),
            })
        }
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> Result<&mut Block> {
        let len = self.blocks.len();
        self.blocks
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange { index, len })
    }

    pub(crate) fn insert_at(&mut self, index: usize, block: Block) {
        self.blocks.insert(index, block);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Block {
        self.blocks.remove(index)
    }

    pub(crate) fn bump(&mut self) {
        self.version += 1;
    }
}

/// Make a table block's rows rectangular with at least one row and column.
pub(crate) fn normalize_table(block: &mut Block) {
    let width = block
        .rows
        .as_ref()
        .map(|rows| rows.iter().map(|r| r.len()).max().unwrap_or(0))
        .unwrap_or(0);
    if width == 0 {
        block.rows = None;
        block.init_kind_defaults();
        return;
    }
    if let Some(rows) = block.rows.as_mut() {
        if rows.iter().any(|r| r.len() != width) {
            tracing::warn!("table {} has ragged rows, padding to {} columns", block.id.short(), width);
        }
        for row in rows.iter_mut() {
            row.resize(width, String::new());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
