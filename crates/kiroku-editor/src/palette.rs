//! Slash-command palette.
//!
//! A small state machine: closed, or open anchored at one block. The host
//! renders [`CommandPalette::state`] and forwards raw key and click events;
//! the palette answers with a [`PaletteOutcome`] and never touches the
//! document itself. Committing is the session's job.

use serde::{Deserialize, Serialize};

use kiroku_types::{BlockKind, CalloutKind};

/// One entry in the palette list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteCommand {
    pub label: String,
    pub kind: BlockKind,
    /// Callout variant to apply when `kind` is Callout.
    #[serde(default)]
    pub callout: Option<CalloutKind>,
    /// Short description shown under the label.
    #[serde(default)]
    pub hint: Option<String>,
}

impl PaletteCommand {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            label: kind.label().to_string(),
            kind,
            callout: None,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn callout(variant: CalloutKind, label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: BlockKind::Callout,
            callout: Some(variant),
            hint: None,
        }
    }
}

/// Which commands a host offers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSet {
    /// Text, headings, lists, table, quote, divider, callout.
    #[default]
    Basic,
    /// Basic plus date, time, priority, code, toggle, image and callout
    /// variants.
    Rich,
    Custom(Vec<PaletteCommand>),
}

impl CommandSet {
    pub fn commands(&self) -> Vec<PaletteCommand> {
        match self {
            CommandSet::Basic => basic_commands(),
            CommandSet::Rich => {
                let mut commands = basic_commands();
                commands.extend([
                    PaletteCommand::callout(CalloutKind::Warning, "Warning callout"),
                    PaletteCommand::callout(CalloutKind::Success, "Success callout"),
                    PaletteCommand::callout(CalloutKind::Error, "Error callout"),
                    PaletteCommand::new(BlockKind::Date).with_hint("YYYY-MM-DD"),
                    PaletteCommand::new(BlockKind::Time).with_hint("HH:MM"),
                    PaletteCommand::new(BlockKind::Priority),
                    PaletteCommand::new(BlockKind::Code),
                    PaletteCommand::new(BlockKind::Toggle).with_hint("Collapsible section"),
                    PaletteCommand::new(BlockKind::Image),
                ]);
                commands
            }
            CommandSet::Custom(commands) => commands.clone(),
        }
    }
}

fn basic_commands() -> Vec<PaletteCommand> {
    vec![
        PaletteCommand::new(BlockKind::Text).with_hint("Plain paragraph"),
        PaletteCommand::new(BlockKind::Heading1).with_hint("#"),
        PaletteCommand::new(BlockKind::Heading2).with_hint("##"),
        PaletteCommand::new(BlockKind::Heading3).with_hint("###"),
        PaletteCommand::new(BlockKind::Bulleted).with_hint("-"),
        PaletteCommand::new(BlockKind::Numbered).with_hint("1."),
        PaletteCommand::new(BlockKind::Todo).with_hint("[ ]"),
        PaletteCommand::new(BlockKind::Table).with_hint("|"),
        PaletteCommand::new(BlockKind::Quote).with_hint(">"),
        PaletteCommand::new(BlockKind::Divider).with_hint("---"),
        PaletteCommand::callout(CalloutKind::Info, "Callout"),
    ]
}

/// Screen position the palette is drawn at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// What opened the palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The user typed `/` in the block.
    Slash,
    /// The "add block" button beside the block.
    AddButton,
}

/// Render data for an open palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpenPalette {
    pub block_index: usize,
    pub anchor: Anchor,
    pub trigger: Trigger,
    pub highlighted: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKey {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

/// Where a click landed, from the palette's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    /// Inside the palette.
    Palette,
    /// An "add block" button, by block index.
    AddButton(usize),
    Elsewhere,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaletteOutcome {
    /// The palette is closed or the event is not for it.
    Ignored,
    /// Highlight moved to this index.
    Moved(usize),
    Closed,
    Commit {
        block_index: usize,
        trigger: Trigger,
        command: PaletteCommand,
    },
}

pub struct CommandPalette {
    commands: Vec<PaletteCommand>,
    open: Option<OpenPalette>,
}

impl CommandPalette {
    pub fn new(set: &CommandSet) -> Self {
        Self {
            commands: set.commands(),
            open: None,
        }
    }

    pub fn commands(&self) -> &[PaletteCommand] {
        &self.commands
    }

    pub fn state(&self) -> Option<&OpenPalette> {
        self.open.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Open at `block_index`. Any palette already open is replaced.
    pub fn open(&mut self, block_index: usize, anchor: Anchor, trigger: Trigger) {
        if self.commands.is_empty() {
            tracing::debug!("palette has no commands, not opening");
            return;
        }
        if let Some(prev) = self.open {
            tracing::debug!("palette at block {} replaced", prev.block_index);
        }
        self.open = Some(OpenPalette {
            block_index,
            anchor,
            trigger,
            highlighted: 0,
        });
    }

    pub fn close(&mut self) -> PaletteOutcome {
        match self.open.take() {
            Some(_) => PaletteOutcome::Closed,
            None => PaletteOutcome::Ignored,
        }
    }

    pub fn key(&mut self, key: PaletteKey) -> PaletteOutcome {
        let len = self.commands.len();
        let Some(state) = self.open.as_mut() else {
            return PaletteOutcome::Ignored;
        };
        match key {
            PaletteKey::ArrowDown => {
                state.highlighted = (state.highlighted + 1) % len;
                PaletteOutcome::Moved(state.highlighted)
            }
            PaletteKey::ArrowUp => {
                state.highlighted = (state.highlighted + len - 1) % len;
                PaletteOutcome::Moved(state.highlighted)
            }
            PaletteKey::Enter => {
                let index = state.highlighted;
                self.commit(index)
            }
            PaletteKey::Escape => self.close(),
        }
    }

    /// A click on the command at `index`.
    pub fn click(&mut self, index: usize) -> PaletteOutcome {
        if !self.is_open() || index >= self.commands.len() {
            return PaletteOutcome::Ignored;
        }
        self.commit(index)
    }

    /// A click somewhere other than a command row.
    ///
    /// Clicks inside the palette, and on the button that opened it, keep it
    /// open.
    pub fn click_outside(&mut self, target: ClickTarget) -> PaletteOutcome {
        let Some(state) = self.open else {
            return PaletteOutcome::Ignored;
        };
        match target {
            ClickTarget::Palette => PaletteOutcome::Ignored,
            ClickTarget::AddButton(index)
                if state.trigger == Trigger::AddButton && index == state.block_index =>
            {
                PaletteOutcome::Ignored
            }
            _ => self.close(),
        }
    }

    fn commit(&mut self, index: usize) -> PaletteOutcome {
        let (Some(state), Some(command)) = (self.open.take(), self.commands.get(index)) else {
            return PaletteOutcome::Ignored;
        };
        tracing::debug!("palette commit {} at block {}", command.kind, state.block_index);
        PaletteOutcome::Commit {
            block_index: state.block_index,
            trigger: state.trigger,
            command: command.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_palette() -> CommandPalette {
        let mut palette = CommandPalette::new(&CommandSet::Basic);
        palette.open(2, Anchor { x: 10.0, y: 20.0 }, Trigger::Slash);
        palette
    }

    #[test]
    fn test_basic_command_order() {
        let kinds: Vec<_> = CommandSet::Basic.commands().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Text,
                BlockKind::Heading1,
                BlockKind::Heading2,
                BlockKind::Heading3,
                BlockKind::Bulleted,
                BlockKind::Numbered,
                BlockKind::Todo,
                BlockKind::Table,
                BlockKind::Quote,
                BlockKind::Divider,
                BlockKind::Callout,
            ]
        );
    }

    #[test]
    fn test_rich_extends_basic() {
        let basic = CommandSet::Basic.commands();
        let rich = CommandSet::Rich.commands();
        assert_eq!(&rich[..basic.len()], &basic[..]);
        assert!(rich.iter().any(|c| c.kind == BlockKind::Date));
        assert!(rich.iter().any(|c| c.callout == Some(CalloutKind::Warning)));
    }

    #[test]
    fn test_arrows_wrap_around() {
        let mut palette = open_palette();
        let last = palette.commands().len() - 1;
        assert_eq!(palette.key(PaletteKey::ArrowUp), PaletteOutcome::Moved(last));
        assert_eq!(palette.key(PaletteKey::ArrowDown), PaletteOutcome::Moved(0));
        assert_eq!(palette.key(PaletteKey::ArrowDown), PaletteOutcome::Moved(1));
    }

    #[test]
    fn test_enter_commits_highlighted() {
        let mut palette = open_palette();
        palette.key(PaletteKey::ArrowDown);
        match palette.key(PaletteKey::Enter) {
            PaletteOutcome::Commit {
                block_index,
                trigger,
                command,
            } => {
                assert_eq!(block_index, 2);
                assert_eq!(trigger, Trigger::Slash);
                assert_eq!(command.kind, BlockKind::Heading1);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(!palette.is_open());
    }

    #[test]
    fn test_click_commits_clicked_command() {
        let mut palette = open_palette();
        let outcome = palette.click(9);
        assert!(matches!(
            outcome,
            PaletteOutcome::Commit { ref command, .. } if command.kind == BlockKind::Divider
        ));
        assert_eq!(palette.click(0), PaletteOutcome::Ignored);
    }

    #[test]
    fn test_escape_and_outside_click_close() {
        let mut palette = open_palette();
        assert_eq!(palette.key(PaletteKey::Escape), PaletteOutcome::Closed);
        assert_eq!(palette.key(PaletteKey::Escape), PaletteOutcome::Ignored);

        let mut palette = open_palette();
        assert_eq!(palette.click_outside(ClickTarget::Palette), PaletteOutcome::Ignored);
        assert!(palette.is_open());
        assert_eq!(palette.click_outside(ClickTarget::Elsewhere), PaletteOutcome::Closed);
    }

    #[test]
    fn test_opening_button_does_not_close() {
        let mut palette = CommandPalette::new(&CommandSet::Basic);
        palette.open(1, Anchor::default(), Trigger::AddButton);
        assert_eq!(palette.click_outside(ClickTarget::AddButton(1)), PaletteOutcome::Ignored);
        assert_eq!(palette.click_outside(ClickTarget::AddButton(0)), PaletteOutcome::Closed);
    }

    #[test]
    fn test_open_replaces_previous() {
        let mut palette = open_palette();
        palette.key(PaletteKey::ArrowDown);
        palette.open(0, Anchor::default(), Trigger::AddButton);
        let state = palette.state().unwrap();
        assert_eq!(state.block_index, 0);
        assert_eq!(state.highlighted, 0);
        assert_eq!(state.trigger, Trigger::AddButton);
    }

    #[test]
    fn test_custom_command_set_from_ron() {
        let set: CommandSet =
            ron::from_str(r#"custom([(label: "Task", kind: todo, hint: Some("[ ]"))])"#).unwrap();
        let commands = set.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].kind, BlockKind::Todo);
        assert_eq!(commands[0].callout, None);
    }
}
