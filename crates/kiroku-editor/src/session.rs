//! One editor surface: a document plus the palette and autosave state
//! around it.
//!
//! The host forwards raw events (text changes, keys, clicks, timer ticks)
//! and applies the [`Focus`] each call returns. Refused edits are logged and
//! dropped; they never reach the user.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use kiroku_doc::{Document, Edit, EditError, EditOp, Snapshot};
use kiroku_types::{BlockKind, Caret, Focus};

use crate::autosave::{Autosave, SaveStatus};
use crate::config::EditorConfig;
use crate::palette::{
    Anchor, ClickTarget, CommandPalette, PaletteCommand, PaletteKey, PaletteOutcome, Trigger,
};
use crate::persistence::PersistenceAdapter;

/// Keys the session handles itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorKey {
    Enter,
    Backspace,
    Tab,
    ShiftTab,
    ArrowUp,
    ArrowDown,
    Escape,
}

impl EditorKey {
    fn palette_key(self) -> Option<PaletteKey> {
        match self {
            EditorKey::ArrowUp => Some(PaletteKey::ArrowUp),
            EditorKey::ArrowDown => Some(PaletteKey::ArrowDown),
            EditorKey::Enter => Some(PaletteKey::Enter),
            EditorKey::Escape => Some(PaletteKey::Escape),
            _ => None,
        }
    }
}

/// Whether the session consumed a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Let the text field handle it.
    Unhandled,
    Handled { focus: Option<Focus> },
}

/// A scripted user action, for replaying sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// The block's text changed to `text`.
    Type { index: usize, text: String },
    Key {
        index: usize,
        key: EditorKey,
        #[serde(default)]
        caret: Caret,
    },
    Edit { op: EditOp },
    /// Click the "add block" button beside a block.
    Add { index: usize },
    /// Click a palette command.
    Pick { command: usize },
    Save,
}

pub struct EditorSession<A: PersistenceAdapter> {
    config: EditorConfig,
    doc: Document,
    palette: CommandPalette,
    autosave: Autosave,
    adapter: A,
    /// Byte offset of the `/` that opened the palette, if typing did.
    slash_at: Option<usize>,
    disposed: bool,
}

/// Where a single `/` was typed into `previous` to give `text`.
fn inserted_slash(previous: &str, text: &str) -> Option<usize> {
    if text.len() != previous.len() + 1 {
        return None;
    }
    text.match_indices('/')
        .map(|(at, _)| at)
        .find(|&at| {
            previous.get(..at) == Some(&text[..at]) && previous.get(at..) == Some(&text[at + 1..])
        })
}

impl<A: PersistenceAdapter> EditorSession<A> {
    /// Open a session on whatever `adapter` has stored.
    ///
    /// Unreadable stores start an empty document rather than failing.
    pub fn open(config: EditorConfig, adapter: A) -> Self {
        let doc = match adapter.load() {
            Ok(stored) => kiroku_doc::load(stored.structured.as_deref(), stored.text.as_deref()),
            Err(e) => {
                tracing::warn!(host = %config.host, "failed to load document, starting empty: {}", e);
                Document::new()
            }
        };
        Self::with_document(config, adapter, doc)
    }

    pub fn with_document(config: EditorConfig, adapter: A, doc: Document) -> Self {
        Self {
            palette: CommandPalette::new(&config.commands),
            autosave: Autosave::new(config.autosave_delay()),
            config,
            doc,
            adapter,
            slash_at: None,
            disposed: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn palette(&self) -> &CommandPalette {
        &self.palette
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.autosave.status()
    }

    /// When the next automatic save is due, for scheduling a timer.
    pub fn save_deadline(&self) -> Option<Instant> {
        if self.disposed {
            None
        } else {
            self.autosave.deadline()
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// The text of block `index` changed.
    ///
    /// Typing `/` anywhere in the line opens the palette at `caret_rect`.
    /// Otherwise markdown shortcuts are applied.
    pub fn set_text(&mut self, index: usize, text: &str, caret_rect: Anchor) -> Option<Focus> {
        let slash = self
            .doc
            .get(index)
            .and_then(|b| inserted_slash(&b.text, text));
        let result = self.doc.set_text(index, text);
        self.commit_edit(result, "set_text");

        if let Some(at) = slash {
            self.slash_at = Some(at);
            self.palette.open(index, caret_rect, Trigger::Slash);
            return None;
        }
        let result = self.doc.autoformat(index);
        self.commit_edit(result, "autoformat")
    }

    /// A key pressed while block `index` has focus with the caret at `caret`.
    pub fn key(&mut self, index: usize, key: EditorKey, caret: Caret) -> KeyOutcome {
        if self.palette.is_open() {
            if let Some(palette_key) = key.palette_key() {
                let outcome = self.palette.key(palette_key);
                let focus = self.handle_palette(outcome);
                return KeyOutcome::Handled { focus };
            }
            self.palette.close();
        }

        let result = match key {
            EditorKey::Enter => self.doc.split_on_enter(index),
            EditorKey::Backspace
                if matches!(caret, Caret::Start | Caret::At(0))
                    && index > 0
                    && self
                        .doc
                        .get(index)
                        .is_some_and(|b| b.kind.has_text() && b.text.is_empty()) =>
            {
                self.doc.merge_backward(index)
            }
            EditorKey::Tab => self.doc.indent(index),
            EditorKey::ShiftTab => self.doc.outdent(index),
            _ => return KeyOutcome::Unhandled,
        };
        let op = match key {
            EditorKey::Enter => "split_on_enter",
            EditorKey::Backspace => "merge_backward",
            EditorKey::Tab => "indent",
            _ => "outdent",
        };
        let focus = self.commit_edit(result, op);
        KeyOutcome::Handled { focus }
    }

    /// Apply any engine operation directly (toolbar buttons, drag-reorder,
    /// table controls...).
    pub fn apply(&mut self, op: &EditOp) -> Option<Focus> {
        tracing::trace!(?op, "apply");
        let result = self.doc.apply(op);
        self.commit_edit(result, "apply")
    }

    /// The "add block" button beside block `index` was clicked.
    pub fn click_add(&mut self, index: usize, button_rect: Anchor) {
        if self.doc.get(index).is_none() {
            tracing::debug!("add button for missing block {}", index);
            return;
        }
        self.palette.open(index, button_rect, Trigger::AddButton);
    }

    /// A palette command was clicked.
    pub fn click_palette(&mut self, command: usize) -> Option<Focus> {
        let outcome = self.palette.click(command);
        self.handle_palette(outcome)
    }

    /// A click anywhere outside the palette's command rows.
    pub fn click_outside(&mut self, target: ClickTarget) {
        self.palette.click_outside(target);
    }

    /// Run one scripted step.
    pub fn run(&mut self, step: &Step) -> Option<Focus> {
        match step {
            Step::Type { index, text } => self.set_text(*index, text, Anchor::default()),
            Step::Key { index, key, caret } => match self.key(*index, *key, *caret) {
                KeyOutcome::Handled { focus } => focus,
                KeyOutcome::Unhandled => None,
            },
            Step::Edit { op } => self.apply(op),
            Step::Add { index } => {
                self.click_add(*index, Anchor::default());
                None
            }
            Step::Pick { command } => self.click_palette(*command),
            Step::Save => {
                self.save_now();
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Flush if the debounce window has passed. Returns true if a save ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.disposed || !self.autosave.due(now) {
            return false;
        }
        self.flush("autosave")
    }

    /// Flush immediately, cancelling any pending automatic save.
    pub fn save_now(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.autosave.cancel();
        self.flush("save")
    }

    /// Tear down: pending saves are cancelled and nothing is written after
    /// this point.
    pub fn dispose(&mut self) {
        if self.autosave.status().has_unsaved() {
            tracing::info!(host = %self.config.host, "disposing with unsaved edits");
        }
        self.autosave.cancel();
        self.palette.close();
        self.disposed = true;
    }

    fn flush(&mut self, reason: &str) -> bool {
        if !self.autosave.begin() {
            return false;
        }
        let snapshot = Snapshot::of(&self.doc);
        let result = self.adapter.save(&snapshot);
        match &result {
            Ok(()) => tracing::info!(
                host = %self.config.host,
                blocks = self.doc.len(),
                "{} flushed document",
                reason
            ),
            Err(e) => tracing::warn!(host = %self.config.host, "{} failed: {}", reason, e),
        }
        self.autosave.finish(result);
        true
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Mark dirty on change, log refusals, and pass focus through.
    fn commit_edit(&mut self, result: Result<Edit, EditError>, op: &str) -> Option<Focus> {
        match result {
            Ok(edit) => {
                if edit.changed {
                    self.autosave.mark_dirty(Instant::now());
                }
                edit.focus
            }
            Err(e) => {
                tracing::debug!(host = %self.config.host, op, "edit refused: {}", e);
                None
            }
        }
    }

    fn handle_palette(&mut self, outcome: PaletteOutcome) -> Option<Focus> {
        match outcome {
            PaletteOutcome::Commit {
                block_index,
                trigger,
                command,
            } => self.commit_command(block_index, trigger, &command),
            _ => None,
        }
    }

    fn commit_command(&mut self, index: usize, trigger: Trigger, command: &PaletteCommand) -> Option<Focus> {
        let Some(block) = self.doc.get(index) else {
            tracing::debug!("palette target {} no longer exists", index);
            return None;
        };
        let block_id = block.id;

        let slash_at = self.slash_at.take();
        if trigger == Trigger::Slash {
            let stripped = match slash_at {
                Some(at) if block.text.get(at..at + 1) == Some("/") => {
                    Some(format!("{}{}", &block.text[..at], &block.text[at + 1..]))
                }
                _ => block.text.strip_suffix('/').map(str::to_string),
            };
            if let Some(stripped) = stripped {
                let result = self.doc.set_text(index, &stripped);
                self.commit_edit(result, "strip_slash");
            }
        }

        match command.kind {
            BlockKind::Divider | BlockKind::Table => self.insert_structural(index, command.kind),
            kind => {
                let result = self.doc.change_type(index, kind);
                self.commit_edit(result, "change_type");
                if let Some(callout) = command.callout {
                    let result = self.doc.set_callout(index, callout);
                    self.commit_edit(result, "set_callout");
                }
                Some(Focus::end(block_id))
            }
        }
    }

    /// Dividers and tables replace a blank paragraph, or go in after
    /// anything else. A divider is followed by a fresh paragraph so there is
    /// somewhere to keep typing.
    fn insert_structural(&mut self, index: usize, kind: BlockKind) -> Option<Focus> {
        let blank = self.doc.get(index).is_some_and(|b| b.is_blank());
        let target = if blank {
            let result = self.doc.change_type(index, kind);
            self.commit_edit(result, "change_type");
            index
        } else {
            let result = self.doc.insert_block_after(index, Some(kind), None);
            self.commit_edit(result, "insert_block_after");
            index + 1
        };

        if kind == BlockKind::Divider {
            let result = self.doc.insert_block_after(target, Some(BlockKind::Text), Some(0));
            self.commit_edit(result, "insert_block_after")
        } else {
            self.doc.get(target).map(|b| Focus::start(b.id))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn session() -> EditorSession<MemoryStore> {
        EditorSession::open(EditorConfig::default(), MemoryStore::new())
    }

    fn kinds<A: PersistenceAdapter>(s: &EditorSession<A>) -> Vec<BlockKind> {
        s.document().blocks().iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_typing_shortcut_formats_and_focuses_next_line() {
        let mut s = session();
        s.set_text(0, "#", Anchor::default());
        let focus = s.set_text(0, "# Title", Anchor::default());

        assert_eq!(kinds(&s), vec![BlockKind::Heading1, BlockKind::Text]);
        assert_eq!(s.document().blocks()[0].text, "Title");
        assert_eq!(focus, Some(Focus::start(s.document().blocks()[1].id)));
        assert_eq!(s.save_status(), &SaveStatus::Dirty);
    }

    #[test]
    fn test_slash_opens_palette() {
        let mut s = session();
        s.set_text(0, "note", Anchor::default());
        s.set_text(0, "note/", Anchor { x: 4.0, y: 8.0 });

        let state = s.palette().state().unwrap();
        assert_eq!(state.block_index, 0);
        assert_eq!(state.trigger, Trigger::Slash);
        assert_eq!(state.anchor, Anchor { x: 4.0, y: 8.0 });
    }

    #[test]
    fn test_slash_commit_strips_slash_and_changes_type() {
        let mut s = session();
        s.set_text(0, "note", Anchor::default());
        s.set_text(0, "note/", Anchor::default());
        for _ in 0..8 {
            s.key(0, EditorKey::ArrowDown, Caret::End);
        }
        let focus = match s.key(0, EditorKey::Enter, Caret::End) {
            KeyOutcome::Handled { focus } => focus,
            KeyOutcome::Unhandled => panic!("enter should commit"),
        };

        let block = &s.document().blocks()[0];
        assert_eq!(block.kind, BlockKind::Quote);
        assert_eq!(block.text, "note");
        assert_eq!(focus, Some(Focus::end(block.id)));
        assert!(!s.palette().is_open());
    }

    #[test]
    fn test_divider_from_add_button_on_non_blank_block() {
        let mut s = session();
        s.set_text(0, "keep me", Anchor::default());
        s.click_add(0, Anchor::default());
        let focus = s.click_palette(9);

        assert_eq!(kinds(&s), vec![BlockKind::Text, BlockKind::Divider, BlockKind::Text]);
        assert_eq!(s.document().blocks()[0].text, "keep me");
        assert_eq!(focus, Some(Focus::start(s.document().blocks()[2].id)));
    }

    #[test]
    fn test_table_replaces_blank_block() {
        let mut s = session();
        s.click_add(0, Anchor::default());
        let focus = s.click_palette(7);

        assert_eq!(kinds(&s), vec![BlockKind::Table]);
        assert_eq!(s.document().blocks()[0].column_count(), 3);
        assert_eq!(focus, Some(Focus::start(s.document().blocks()[0].id)));
    }

    #[test]
    fn test_keys_without_palette() {
        let mut s = session();
        s.set_text(0, "- a", Anchor::default());
        // "- a" became a bulleted item plus an empty paragraph.
        s.apply(&EditOp::Delete { index: 1 });

        let KeyOutcome::Handled { focus } = s.key(0, EditorKey::Enter, Caret::End) else {
            panic!("enter is handled");
        };
        assert_eq!(kinds(&s), vec![BlockKind::Bulleted, BlockKind::Bulleted]);
        assert_eq!(focus, Some(Focus::start(s.document().blocks()[1].id)));

        s.key(1, EditorKey::Tab, Caret::Start);
        assert_eq!(s.document().blocks()[1].indent, 1);
        s.key(1, EditorKey::ShiftTab, Caret::Start);
        assert_eq!(s.document().blocks()[1].indent, 0);

        assert_eq!(s.key(1, EditorKey::Backspace, Caret::At(3)), KeyOutcome::Unhandled);
        assert!(matches!(s.key(1, EditorKey::Backspace, Caret::Start), KeyOutcome::Handled { .. }));
        assert_eq!(s.document().len(), 1);

        assert_eq!(s.key(0, EditorKey::Backspace, Caret::Start), KeyOutcome::Unhandled);
        assert_eq!(s.key(0, EditorKey::ArrowDown, Caret::Start), KeyOutcome::Unhandled);
    }

    #[test]
    fn test_backspace_keeps_text_after_divider() {
        let mut s = session();
        s.set_text(0, "---", Anchor::default());
        s.set_text(1, "important notes", Anchor::default());
        assert_eq!(kinds(&s), vec![BlockKind::Divider, BlockKind::Text]);

        assert_eq!(s.key(1, EditorKey::Backspace, Caret::Start), KeyOutcome::Unhandled);
        assert_eq!(kinds(&s), vec![BlockKind::Divider, BlockKind::Text]);
        assert_eq!(s.document().blocks()[1].text, "important notes");

        s.set_text(1, "", Anchor::default());
        assert!(matches!(s.key(1, EditorKey::Backspace, Caret::Start), KeyOutcome::Handled { .. }));
        assert_eq!(kinds(&s), vec![BlockKind::Divider]);
    }

    #[test]
    fn test_backspace_at_table_start_keeps_table() {
        let mut s = session();
        s.set_text(0, "intro", Anchor::default());
        s.apply(&EditOp::InsertAfter {
            index: 0,
            kind: Some(BlockKind::Table),
            indent: None,
        });
        s.apply(&EditOp::SetCell {
            index: 1,
            row: 0,
            col: 0,
            value: "data".into(),
        });

        assert_eq!(s.key(1, EditorKey::Backspace, Caret::Start), KeyOutcome::Unhandled);
        assert_eq!(kinds(&s), vec![BlockKind::Text, BlockKind::Table]);
        assert_eq!(s.document().blocks()[1].rows.as_ref().map(|r| r[0][0].as_str()), Some("data"));
    }

    #[test]
    fn test_slash_mid_line_opens_palette_and_is_stripped() {
        let mut s = session();
        s.set_text(0, "buy milk", Anchor::default());
        s.set_text(0, "buy /milk", Anchor::default());
        assert_eq!(s.palette().state().map(|p| p.trigger), Some(Trigger::Slash));

        // Quote is the ninth basic command.
        for _ in 0..8 {
            s.key(0, EditorKey::ArrowDown, Caret::End);
        }
        s.key(0, EditorKey::Enter, Caret::End);

        let block = &s.document().blocks()[0];
        assert_eq!(block.kind, BlockKind::Quote);
        assert_eq!(block.text, "buy milk");
    }

    #[test]
    fn test_inserted_slash() {
        assert_eq!(inserted_slash("note", "note/"), Some(4));
        assert_eq!(inserted_slash("ab", "a/b"), Some(1));
        assert_eq!(inserted_slash("a/b", "a//b"), Some(1));
        assert_eq!(inserted_slash("note", "notes"), None);
        assert_eq!(inserted_slash("note", "no/te/"), None);
        assert_eq!(inserted_slash("", "/"), Some(0));
        assert_eq!(inserted_slash("é", "x/"), None);
    }

    #[test]
    fn test_refused_edit_is_noop() {
        let mut s = session();
        assert_eq!(s.apply(&EditOp::ToggleTodo { index: 0, checked: true }), None);
        assert_eq!(s.apply(&EditOp::Indent { index: 42 }), None);
        assert_eq!(s.save_status(), &SaveStatus::Saved);
        assert_eq!(s.document().version(), 0);
    }

    #[test]
    fn test_escape_closes_palette_without_commit() {
        let mut s = session();
        s.click_add(0, Anchor::default());
        assert!(s.palette().is_open());
        s.key(0, EditorKey::Escape, Caret::Start);
        assert!(!s.palette().is_open());
        assert_eq!(kinds(&s), vec![BlockKind::Text]);
    }

    #[test]
    fn test_step_serde() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                {"step": "type", "index": 0, "text": "hello"},
                {"step": "key", "index": 0, "key": "enter"},
                {"step": "edit", "op": {"op": "indent", "index": 1}},
                {"step": "save"}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            steps[1],
            Step::Key {
                index: 0,
                key: EditorKey::Enter,
                caret: Caret::Start
            }
        );

        let mut s = session();
        for step in &steps {
            s.run(step);
        }
        assert_eq!(s.adapter().last().map(|snap| snap.text.as_str()), Some("hello\n  "));
    }
}
