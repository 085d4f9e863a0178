//! Markdown-style shortcuts typed into a plain paragraph.
//!
//! After each text change on a `text` block the host asks [`detect`] whether
//! the (left-trimmed) text starts with a recognised marker. Rules are tried in
//! a fixed order and the first match wins:
//!
//! | Typed       | Becomes               |
//! |-------------|-----------------------|
//! | `---`       | divider (exact match) |
//! | `# `        | heading1              |
//! | `## `       | heading2              |
//! | `### `      | heading3              |
//! | `> `        | quote                 |
//! | `- `        | bulleted              |
//! | `1. `       | numbered              |
//! | `[ ] `      | todo (unchecked)      |
//! | `[x] `      | todo (checked)        |
//! | `\| `       | table, 1×3            |
//!
//! Applying a match rewrites the block in place and appends an empty
//! paragraph after it, which receives focus.

use std::sync::LazyLock;

use regex::Regex;

use kiroku_types::{Block, BlockKind, DEFAULT_TABLE_COLUMNS, Focus};

use crate::{Document, Edit, Result};

static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("numbered marker regex"));

static TODO_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[( |x|X)\]\s").expect("todo marker regex"));

/// A recognised shortcut: the kind to switch to and what is left of the text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortcut {
    pub kind: BlockKind,
    /// Text after the marker.
    pub text: String,
    /// Todo only.
    pub checked: bool,
    /// Table only: the initial 1×3 row, first cell holding `text`.
    pub rows: Option<Vec<Vec<String>>>,
}

impl Shortcut {
    fn new(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            checked: false,
            rows: None,
        }
    }
}

/// Match `text` against the shortcut rules.
pub fn detect(text: &str) -> Option<Shortcut> {
    let trimmed = text.trim_start();

    if trimmed == "---" {
        return Some(Shortcut::new(BlockKind::Divider, ""));
    }

    const PREFIXES: [(&str, BlockKind); 5] = [
        ("# ", BlockKind::Heading1),
        ("## ", BlockKind::Heading2),
        ("### ", BlockKind::Heading3),
        ("> ", BlockKind::Quote),
        ("- ", BlockKind::Bulleted),
    ];
    for (prefix, kind) in PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return Some(Shortcut::new(kind, rest));
        }
    }

    if let Some(m) = NUMBERED_MARKER.find(trimmed) {
        return Some(Shortcut::new(BlockKind::Numbered, &trimmed[m.end()..]));
    }

    if let Some(caps) = TODO_MARKER.captures(trimmed) {
        let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let checked = caps.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case("x"));
        return Some(Shortcut {
            checked,
            ..Shortcut::new(BlockKind::Todo, &trimmed[end..])
        });
    }

    if let Some(rest) = trimmed.strip_prefix("| ") {
        let mut row = vec![String::new(); DEFAULT_TABLE_COLUMNS];
        row[0] = rest.to_string();
        return Some(Shortcut {
            rows: Some(vec![row]),
            ..Shortcut::new(BlockKind::Table, "")
        });
    }

    None
}

impl Document {
    /// Apply a typed shortcut to the block at `index`, if it has one.
    ///
    /// Only `text` blocks are inspected. On a match the block keeps its id
    /// and indent, takes the new kind and stripped text, and an empty
    /// paragraph is inserted after it with focus.
    pub fn autoformat(&mut self, index: usize) -> Result<Edit> {
        let block = self.block_mut(index)?;
        if block.kind != BlockKind::Text {
            return Ok(Edit::unchanged());
        }
        let Some(shortcut) = detect(&block.text) else {
            return Ok(Edit::unchanged());
        };

        tracing::debug!("autoformat {} -> {}", block.id.short(), shortcut.kind);
        block.kind = shortcut.kind;
        block.text = shortcut.text;
        block.checked = shortcut.checked;
        block.rows = shortcut.rows;
        block.init_kind_defaults();

        let next = Block::text("");
        let focus = Focus::start(next.id);
        self.insert_at(index + 1, next);
        self.bump();
        Ok(Edit::focus(focus))
    }
}

// ============================================================================
// Tests
// ============================================================================
