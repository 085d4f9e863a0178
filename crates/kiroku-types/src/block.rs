//! Block types: the unit of content in a kiroku document.
//!
//! ## Design: BlockKind + auxiliary fields
//!
//! `BlockKind` says what a block *is*. Most kinds need nothing beyond `text`
//! and `indent`; the few that carry extra state keep it in `Option` fields that
//! are only populated for the relevant kind:
//!
//! - `rows` on Table: rectangular `rows[r][c]` matrix of cell strings
//! - `callout` on Callout, `priority` on Priority
//! - `image` on Image (url + display size)
//! - `value` on Date/Time (`YYYY-MM-DD` / `HH:MM`)
//! - `language` on Code
//!
//! `checked` (Todo) and `expanded` (Toggle) are plain bools that other kinds
//! simply ignore. `style` is orthogonal to kind.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::BlockId;

/// Deepest nesting level a block may carry.
pub const MAX_INDENT: u8 = 6;

/// Column count of a freshly created table.
pub const DEFAULT_TABLE_COLUMNS: usize = 3;

/// The 1×3 table every new table block starts with.
pub fn default_table_rows() -> Vec<Vec<String>> {
    vec![vec![String::new(); DEFAULT_TABLE_COLUMNS]]
}

/// What a block *is* (content type).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Plain paragraph. The only kind autoformat inspects.
    #[default]
    Text,
    #[strum(serialize = "heading1", serialize = "h1")]
    Heading1,
    #[strum(serialize = "heading2", serialize = "h2")]
    Heading2,
    #[strum(serialize = "heading3", serialize = "h3")]
    Heading3,
    #[strum(serialize = "bulleted", serialize = "bullet")]
    Bulleted,
    #[strum(serialize = "numbered", serialize = "number")]
    Numbered,
    #[strum(serialize = "todo", serialize = "checkbox")]
    Todo,
    Quote,
    #[strum(serialize = "divider", serialize = "hr")]
    Divider,
    Callout,
    Table,
    /// Collapsible section header.
    Toggle,
    Code,
    Image,
    Date,
    Time,
    Priority,
}

impl BlockKind {
    /// Every kind, in palette order.
    pub const ALL: [BlockKind; 17] = [
        BlockKind::Text,
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::Bulleted,
        BlockKind::Numbered,
        BlockKind::Todo,
        BlockKind::Quote,
        BlockKind::Divider,
        BlockKind::Callout,
        BlockKind::Table,
        BlockKind::Toggle,
        BlockKind::Code,
        BlockKind::Image,
        BlockKind::Date,
        BlockKind::Time,
        BlockKind::Priority,
    ];

    /// Parse from string (case-insensitive).
    ///
    /// Supports aliases: "h1".."h3", "bullet", "number", "checkbox", "hr".
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Heading1 => "heading1",
            BlockKind::Heading2 => "heading2",
            BlockKind::Heading3 => "heading3",
            BlockKind::Bulleted => "bulleted",
            BlockKind::Numbered => "numbered",
            BlockKind::Todo => "todo",
            BlockKind::Quote => "quote",
            BlockKind::Divider => "divider",
            BlockKind::Callout => "callout",
            BlockKind::Table => "table",
            BlockKind::Toggle => "toggle",
            BlockKind::Code => "code",
            BlockKind::Image => "image",
            BlockKind::Date => "date",
            BlockKind::Time => "time",
            BlockKind::Priority => "priority",
        }
    }

    /// Human label for menus.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Text => "Text",
            BlockKind::Heading1 => "Heading 1",
            BlockKind::Heading2 => "Heading 2",
            BlockKind::Heading3 => "Heading 3",
            BlockKind::Bulleted => "Bulleted list",
            BlockKind::Numbered => "Numbered list",
            BlockKind::Todo => "To-do list",
            BlockKind::Quote => "Quote",
            BlockKind::Divider => "Divider",
            BlockKind::Callout => "Callout",
            BlockKind::Table => "Table",
            BlockKind::Toggle => "Toggle",
            BlockKind::Code => "Code",
            BlockKind::Image => "Image",
            BlockKind::Date => "Date",
            BlockKind::Time => "Time",
            BlockKind::Priority => "Priority",
        }
    }

    /// List kinds continue onto the next line when Enter is pressed.
    pub fn is_list(&self) -> bool {
        matches!(self, BlockKind::Bulleted | BlockKind::Numbered | BlockKind::Todo)
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3)
    }

    /// Whether `text` carries user content for this kind.
    pub fn has_text(&self) -> bool {
        !matches!(self, BlockKind::Divider | BlockKind::Table)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Inline style flags. Orthogonal to [`BlockKind`] and never written to the
/// plain-text form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BlockStyle {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_default_alignment")]
    pub align: Alignment,
}

impl BlockStyle {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Visual variant of a callout block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum CalloutKind {
    #[default]
    Info,
    #[strum(serialize = "warning", serialize = "warn")]
    Warning,
    Success,
    Error,
}

impl CalloutKind {
    pub const ALL: [CalloutKind; 4] = [
        CalloutKind::Info,
        CalloutKind::Warning,
        CalloutKind::Success,
        CalloutKind::Error,
    ];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutKind::Info => "info",
            CalloutKind::Warning => "warning",
            CalloutKind::Success => "success",
            CalloutKind::Error => "error",
        }
    }
}

/// Level carried by a priority block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Display size of an image block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

/// Source and size of an image block. `text` on the block is the alt text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ImageAttrs {
    pub url: String,
    #[serde(default)]
    pub size: ImageSize,
}

/// One addressable unit of content.
///
/// ## Field groups
///
/// - **Core**: id, kind, text, indent, style
/// - **Todo / Toggle**: checked, expanded
/// - **Table**: rows
/// - **Aux** (kind-specific): callout, priority, image, value, language
///
/// Serializes as the structured projection: `kind` is written as `type`, and
/// defaulted fields are omitted so a plain paragraph is `{id, type, text}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    /// Nesting depth, `0..=MAX_INDENT`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub indent: u8,
    #[serde(default, skip_serializing_if = "is_false")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "BlockStyle::is_plain")]
    pub style: BlockStyle,

    // Kind-specific fields

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callout: Option<CalloutKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttrs>,
    /// Date (`YYYY-MM-DD`) or time (`HH:MM`) value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Helper for `#[serde(skip_serializing_if)]` on bool fields.
fn is_false(v: &bool) -> bool {
    !v
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

fn is_default_alignment(a: &Alignment) -> bool {
    *a == Alignment::Left
}

impl Block {
    /// Create a block with a fresh id and the defaults its kind requires.
    ///
    /// `indent` is clamped to [`MAX_INDENT`]. Dividers and tables never carry
    /// text, so `text` is dropped for them.
    pub fn new(kind: BlockKind, text: impl Into<String>, indent: u8) -> Self {
        let mut block = Self {
            id: BlockId::new(),
            kind,
            text: String::new(),
            indent: indent.min(MAX_INDENT),
            checked: false,
            expanded: false,
            rows: None,
            style: BlockStyle::default(),
            callout: None,
            priority: None,
            image: None,
            value: None,
            language: None,
        };
        if kind.has_text() {
            block.text = text.into();
        }
        // New toggles start open so their body is visible while typing.
        block.expanded = kind == BlockKind::Toggle;
        block.init_kind_defaults();
        block
    }

    /// An empty paragraph.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Text, text, 0)
    }

    /// An empty 1×3 table.
    pub fn table() -> Self {
        Self::new(BlockKind::Table, "", 0)
    }

    /// Fill in auxiliary fields the current kind needs but lacks.
    ///
    /// Never overwrites a value that is already present.
    pub fn init_kind_defaults(&mut self) {
        match self.kind {
            BlockKind::Table => {
                if self.rows.as_ref().is_none_or(|r| r.is_empty()) {
                    self.rows = Some(default_table_rows());
                }
            }
            BlockKind::Callout if self.callout.is_none() => {
                self.callout = Some(CalloutKind::default());
            }
            BlockKind::Priority if self.priority.is_none() => {
                self.priority = Some(Priority::default());
            }
            BlockKind::Image if self.image.is_none() => {
                self.image = Some(ImageAttrs::default());
            }
            _ => {}
        }
    }

    /// Same content under a new id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: BlockId::new(),
            ..self.clone()
        }
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_style(mut self, style: BlockStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_image(mut self, url: impl Into<String>, size: ImageSize) -> Self {
        self.image = Some(ImageAttrs {
            url: url.into(),
            size,
        });
        self
    }

    /// Image url, empty when absent.
    pub fn image_url(&self) -> &str {
        self.image.as_ref().map(|i| i.url.as_str()).unwrap_or("")
    }

    /// Column count of a table block (0 when `rows` is absent).
    pub fn column_count(&self) -> usize {
        self.rows
            .as_ref()
            .and_then(|r| r.first())
            .map(|row| row.len())
            .unwrap_or(0)
    }

    /// Whether every table row has the same column count.
    pub fn is_rectangular(&self) -> bool {
        match &self.rows {
            None => true,
            Some(rows) => {
                let width = self.column_count();
                rows.iter().all(|r| r.len() == width)
            }
        }
    }

    /// Empty text and nothing structural to lose.
    pub fn is_blank(&self) -> bool {
        self.kind == BlockKind::Text && self.text.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
