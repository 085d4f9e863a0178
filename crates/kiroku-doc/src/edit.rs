//! Structural edit operations.
//!
//! Every operation validates its arguments before touching anything: an
//! `Err` means the document is unchanged. A successful call returns an
//! [`Edit`] saying whether anything changed and where focus should go next.

use kiroku_types::{
    Block, BlockKind, BlockStyle, CalloutKind, Focus, ImageAttrs, MAX_INDENT, Priority,
    validate_date, validate_time,
};

use crate::{Document, EditError, Result};

/// Outcome of a successful edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edit {
    /// Whether the block list changed.
    pub changed: bool,
    /// Block (and caret) the host should focus, when the edit moves attention.
    pub focus: Option<Focus>,
}

impl Edit {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed() -> Self {
        Self {
            changed: true,
            focus: None,
        }
    }

    pub fn focus(focus: Focus) -> Self {
        Self {
            changed: true,
            focus: Some(focus),
        }
    }
}

impl Document {
    /// Insert a new block directly after `index`.
    ///
    /// With an explicit `kind` the new block has that kind at indent 0.
    /// Otherwise a list block (bulleted, numbered, todo) continues its list at
    /// the same indent, and anything else is followed by a plain paragraph at
    /// indent 0. An explicit `indent` wins over either default.
    pub fn insert_block_after(
        &mut self,
        index: usize,
        kind: Option<BlockKind>,
        indent: Option<u8>,
    ) -> Result<Edit> {
        let current = self.get(index).ok_or(EditError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;

        let (new_kind, inherited_indent) = match kind {
            Some(kind) => (kind, 0),
            None if current.kind.is_list() => (current.kind, current.indent),
            None => (BlockKind::Text, 0),
        };
        let block = Block::new(new_kind, "", indent.unwrap_or(inherited_indent));
        let id = block.id;

        self.insert_at(index + 1, block);
        self.bump();
        tracing::trace!("inserted {} block {} at {}", new_kind, id.short(), index + 1);
        Ok(Edit::focus(Focus::start(id)))
    }

    /// Enter pressed at the end of a block.
    ///
    /// Same as [`insert_block_after`](Self::insert_block_after) with no
    /// explicit kind, except that a divider is always followed by a
    /// paragraph.
    pub fn split_on_enter(&mut self, index: usize) -> Result<Edit> {
        let kind = match self.get(index) {
            Some(block) if block.kind == BlockKind::Divider => Some(BlockKind::Text),
            Some(_) => None,
            None => {
                return Err(EditError::IndexOutOfRange {
                    index,
                    len: self.len(),
                });
            }
        };
        let indent = kind.map(|_| 0);
        self.insert_block_after(index, kind, indent)
    }

    /// Backspace at the start of a block.
    ///
    /// The block's text is appended to the previous block and the block is
    /// removed; focus lands at the join point. Dividers and tables have no
    /// text to merge into, so the current block is dropped and focus moves to
    /// the block that took its place, falling back to the predecessor of the
    /// divider and then the divider itself.
    ///
    /// A table, or a non-empty block that would be dropped after a divider
    /// or table, is refused with [`EditError::WouldDropContent`].
    pub fn merge_backward(&mut self, index: usize) -> Result<Edit> {
        self.check_index(index)?;
        if index == 0 {
            return Err(EditError::NoPreviousBlock);
        }

        let prev_kind = self.blocks()[index - 1].kind;
        let current = &self.blocks()[index];
        if current.kind == BlockKind::Table || (!prev_kind.has_text() && !current.text.is_empty()) {
            return Err(EditError::WouldDropContent { index });
        }
        let removed = self.remove_at(index);

        let focus = if !prev_kind.has_text() {
            let target = self
                .get(index)
                .or_else(|| index.checked_sub(2).and_then(|i| self.get(i)))
                .unwrap_or(&self.blocks()[index - 1]);
            Focus::end(target.id)
        } else {
            let prev = self.block_mut(index - 1)?;
            let join = prev.text.chars().count();
            prev.text.push_str(&removed.text);
            Focus::at(prev.id, join)
        };

        self.bump();
        Ok(Edit::focus(focus))
    }

    /// Change a block's kind in place.
    ///
    /// Text, indent and unrelated aux fields are kept. Dividers lose their
    /// text, and kinds that need aux state (table rows, callout variant,
    /// priority level, image) get defaults when they have none.
    pub fn change_type(&mut self, index: usize, kind: BlockKind) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind == kind {
            return Ok(Edit::unchanged());
        }
        block.kind = kind;
        if !kind.has_text() {
            block.text.clear();
        }
        if kind == BlockKind::Toggle {
            block.expanded = true;
        }
        block.init_kind_defaults();
        let focus = if kind == BlockKind::Divider {
            None
        } else {
            Some(Focus::end(block.id))
        };
        self.bump();
        Ok(Edit {
            changed: true,
            focus,
        })
    }

    /// Nest one level deeper (max [`MAX_INDENT`]).
    pub fn indent(&mut self, index: usize) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.indent >= MAX_INDENT {
            return Ok(Edit::unchanged());
        }
        block.indent += 1;
        self.bump();
        Ok(Edit::changed())
    }

    /// Un-nest one level (min 0).
    pub fn outdent(&mut self, index: usize) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.indent == 0 {
            return Ok(Edit::unchanged());
        }
        block.indent -= 1;
        self.bump();
        Ok(Edit::changed())
    }

    /// Set the checked flag of a todo block.
    pub fn toggle_todo(&mut self, index: usize, checked: bool) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind != BlockKind::Todo {
            return Err(EditError::UnsupportedKind {
                op: "toggle_todo",
                kind: block.kind,
            });
        }
        if block.checked == checked {
            return Ok(Edit::unchanged());
        }
        block.checked = checked;
        self.bump();
        Ok(Edit::changed())
    }

    /// Move the block at `from` so that it ends up at index `to`.
    ///
    /// Both indices refer to the document before the move.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<Edit> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(Edit::unchanged());
        }
        let block = self.remove_at(from);
        tracing::trace!("moving block {} from {} to {}", block.id.short(), from, to);
        self.insert_at(to, block);
        self.bump();
        Ok(Edit::changed())
    }

    /// Replace a block's text.
    pub fn set_text(&mut self, index: usize, text: &str) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if !block.kind.has_text() {
            return Err(EditError::UnsupportedKind {
                op: "set_text",
                kind: block.kind,
            });
        }
        if block.text == text {
            return Ok(Edit::unchanged());
        }
        block.text = text.to_string();
        self.bump();
        Ok(Edit::changed())
    }

    /// Remove a block outright.
    ///
    /// Focus moves to the end of the previous block, or the start of the new
    /// first block. Removing the only block leaves a fresh empty paragraph.
    pub fn delete_block(&mut self, index: usize) -> Result<Edit> {
        self.check_index(index)?;
        let removed = self.remove_at(index);
        tracing::trace!("deleted block {}", removed.id.short());

        let focus = match self.ensure_non_empty() {
            Some(id) => Focus::start(id),
            None if index > 0 => Focus::end(self.blocks()[index - 1].id),
            None => Focus::start(self.blocks()[0].id),
        };
        self.bump();
        Ok(Edit::focus(focus))
    }

    /// Insert a copy of the block (with a new id) right after it.
    pub fn duplicate_block(&mut self, index: usize) -> Result<Edit> {
        let copy = self
            .get(index)
            .ok_or(EditError::IndexOutOfRange {
                index,
                len: self.len(),
            })?
            .duplicate();
        let focus = Focus::end(copy.id);
        self.insert_at(index + 1, copy);
        self.bump();
        Ok(Edit::focus(focus))
    }

    pub fn set_style(&mut self, index: usize, style: BlockStyle) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.style == style {
            return Ok(Edit::unchanged());
        }
        block.style = style;
        self.bump();
        Ok(Edit::changed())
    }

    /// Flip a toggle block open or closed.
    pub fn toggle_expanded(&mut self, index: usize) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind != BlockKind::Toggle {
            return Err(EditError::UnsupportedKind {
                op: "toggle_expanded",
                kind: block.kind,
            });
        }
        block.expanded = !block.expanded;
        self.bump();
        Ok(Edit::changed())
    }

    pub fn set_callout(&mut self, index: usize, callout: CalloutKind) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind != BlockKind::Callout {
            return Err(EditError::UnsupportedKind {
                op: "set_callout",
                kind: block.kind,
            });
        }
        if block.callout == Some(callout) {
            return Ok(Edit::unchanged());
        }
        block.callout = Some(callout);
        self.bump();
        Ok(Edit::changed())
    }

    pub fn set_priority(&mut self, index: usize, priority: Priority) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind != BlockKind::Priority {
            return Err(EditError::UnsupportedKind {
                op: "set_priority",
                kind: block.kind,
            });
        }
        if block.priority == Some(priority) {
            return Ok(Edit::unchanged());
        }
        block.priority = Some(priority);
        self.bump();
        Ok(Edit::changed())
    }

    /// Set the value of a date (`YYYY-MM-DD`) or time (`HH:MM`) block.
    ///
    /// An empty value clears it.
    pub fn set_value(&mut self, index: usize, value: &str) -> Result<Edit> {
        let block = self.block_mut(index)?;
        match block.kind {
            BlockKind::Date if !value.is_empty() => validate_date(value)?,
            BlockKind::Time if !value.is_empty() => validate_time(value)?,
            BlockKind::Date | BlockKind::Time => {}
            kind => {
                return Err(EditError::UnsupportedKind {
                    op: "set_value",
                    kind,
                });
            }
        }
        let value = (!value.is_empty()).then(|| value.to_string());
        if block.value == value {
            return Ok(Edit::unchanged());
        }
        block.value = value;
        self.bump();
        Ok(Edit::changed())
    }

    pub fn set_image(&mut self, index: usize, image: ImageAttrs) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind != BlockKind::Image {
            return Err(EditError::UnsupportedKind {
                op: "set_image",
                kind: block.kind,
            });
        }
        if block.image.as_ref() == Some(&image) {
            return Ok(Edit::unchanged());
        }
        block.image = Some(image);
        self.bump();
        Ok(Edit::changed())
    }

    /// Set the language label of a code block. Empty clears it.
    pub fn set_language(&mut self, index: usize, language: &str) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind != BlockKind::Code {
            return Err(EditError::UnsupportedKind {
                op: "set_language",
                kind: block.kind,
            });
        }
        let language = (!language.is_empty()).then(|| language.to_string());
        if block.language == language {
            return Ok(Edit::unchanged());
        }
        block.language = language;
        self.bump();
        Ok(Edit::changed())
    }
}

// ============================================================================
// Tests
// ============================================================================
