//! Edit operations as data.
//!
//! Every engine operation has an [`EditOp`] variant so that edits can be
//! scripted, logged, and replayed. Ops address blocks by index in the
//! document as it is when the op is applied.

use serde::{Deserialize, Serialize};

use kiroku_types::{BlockKind, BlockStyle, CalloutKind, ImageAttrs, Priority};

use crate::{Document, Edit, Result};

/// One edit, addressed by block index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Insert after `index`. Kind and indent are inherited when omitted.
    InsertAfter {
        index: usize,
        #[serde(default)]
        kind: Option<BlockKind>,
        #[serde(default)]
        indent: Option<u8>,
    },
    SplitOnEnter { index: usize },
    MergeBackward { index: usize },
    ChangeType { index: usize, kind: BlockKind },
    Indent { index: usize },
    Outdent { index: usize },
    ToggleTodo { index: usize, checked: bool },
    Move { from: usize, to: usize },
    SetText { index: usize, text: String },
    /// Apply any typed markdown shortcut.
    Autoformat { index: usize },
    Delete { index: usize },
    Duplicate { index: usize },
    SetStyle { index: usize, style: BlockStyle },
    ToggleExpanded { index: usize },
    SetCallout { index: usize, callout: CalloutKind },
    SetPriority { index: usize, priority: Priority },
    SetValue { index: usize, value: String },
    SetImage { index: usize, image: ImageAttrs },
    SetLanguage { index: usize, language: String },
    AddRow { index: usize },
    AddColumn { index: usize },
    DeleteRow { index: usize, row: usize },
    DeleteColumn { index: usize, col: usize },
    SetCell {
        index: usize,
        row: usize,
        col: usize,
        value: String,
    },
}

impl EditOp {
    /// Whether this op can add, remove, or reorder blocks.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EditOp::InsertAfter { .. }
                | EditOp::SplitOnEnter { .. }
                | EditOp::MergeBackward { .. }
                | EditOp::Move { .. }
                | EditOp::Autoformat { .. }
                | EditOp::Delete { .. }
                | EditOp::Duplicate { .. }
        )
    }
}

impl Document {
    /// Apply one op.
    pub fn apply(&mut self, op: &EditOp) -> Result<Edit> {
        match op {
            EditOp::InsertAfter { index, kind, indent } => self.insert_block_after(*index, *kind, *indent),
            EditOp::SplitOnEnter { index } => self.split_on_enter(*index),
            EditOp::MergeBackward { index } => self.merge_backward(*index),
            EditOp::ChangeType { index, kind } => self.change_type(*index, *kind),
            EditOp::Indent { index } => self.indent(*index),
            EditOp::Outdent { index } => self.outdent(*index),
            EditOp::ToggleTodo { index, checked } => self.toggle_todo(*index, *checked),
            EditOp::Move { from, to } => self.move_block(*from, *to),
            EditOp::SetText { index, text } => self.set_text(*index, text),
            EditOp::Autoformat { index } => self.autoformat(*index),
            EditOp::Delete { index } => self.delete_block(*index),
            EditOp::Duplicate { index } => self.duplicate_block(*index),
            EditOp::SetStyle { index, style } => self.set_style(*index, *style),
            EditOp::ToggleExpanded { index } => self.toggle_expanded(*index),
            EditOp::SetCallout { index, callout } => self.set_callout(*index, *callout),
            EditOp::SetPriority { index, priority } => self.set_priority(*index, *priority),
            EditOp::SetValue { index, value } => self.set_value(*index, value),
            EditOp::SetImage { index, image } => self.set_image(*index, image.clone()),
            EditOp::SetLanguage { index, language } => self.set_language(*index, language),
            EditOp::AddRow { index } => self.add_row(*index),
            EditOp::AddColumn { index } => self.add_column(*index),
            EditOp::DeleteRow { index, row } => self.delete_row(*index, *row),
            EditOp::DeleteColumn { index, col } => self.delete_column(*index, *col),
            EditOp::SetCell { index, row, col, value } => self.set_cell(*index, *row, *col, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_json_shape() {
        let op = EditOp::ChangeType {
            index: 2,
            kind: BlockKind::Heading1,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json, serde_json::json!({"op": "change_type", "index": 2, "kind": "heading1"}));

        let parsed: EditOp = serde_json::from_str(r#"{"op": "insert_after", "index": 0}"#).unwrap();
        assert_eq!(
            parsed,
            EditOp::InsertAfter {
                index: 0,
                kind: None,
                indent: None
            }
        );
    }

    #[test]
    fn test_op_categories() {
        assert!(EditOp::Move { from: 0, to: 1 }.is_structural());
        assert!(!EditOp::Indent { index: 0 }.is_structural());
    }

    #[test]
    fn test_apply_script() {
        let script = r#"[
            {"op": "set_text", "index": 0, "text": "- first"},
            {"op": "autoformat", "index": 0},
            {"op": "set_text", "index": 1, "text": "second"},
            {"op": "change_type", "index": 1, "kind": "bulleted"},
            {"op": "indent", "index": 1}
        ]"#;
        let ops: Vec<EditOp> = serde_json::from_str(script).unwrap();
        let mut doc = Document::new();
        for op in &ops {
            doc.apply(op).unwrap();
        }
        assert_eq!(crate::to_text(&doc), "- first\n  - second");
    }
}
