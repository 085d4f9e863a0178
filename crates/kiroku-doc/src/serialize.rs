//! Plain-text and structured projections of a document.
//!
//! # Plain text
//!
//! One line per block, two spaces of leading indent per level, with a
//! markdown-like marker per kind. Lossy: ids, styles and aux fields other
//! than image urls are not written, and parsing mints fresh ids.
//!
//! # Structured
//!
//! A JSON array of block objects (see [`Block`]) that round-trips every
//! field. When it is missing or unreadable, loading falls back to the plain
//! text form.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use kiroku_types::{Block, BlockKind, MAX_INDENT, default_table_rows};

use crate::Document;
use crate::document::normalize_table;

/// Prefix of a table line; the rest is the JSON rows matrix.
pub const TABLE_PREFIX: &str = "TABLE:";

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("numbered line regex"));

static TODO_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:- )?\[( |x|X)\](?:\s|$)").expect("todo line regex"));

static IMAGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[(.*?)\]\((.*)\)$").expect("image line regex"));

/// Both persisted forms of a document, produced together on every save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub text: String,
    pub structured: String,
}

impl Snapshot {
    pub fn of(doc: &Document) -> Self {
        Self {
            text: to_text(doc),
            structured: to_structured_string(doc),
        }
    }
}

// ============================================================================
// Plain text
// ============================================================================

/// Render the document as plain text, one line per block.
pub fn to_text(doc: &Document) -> String {
    doc.blocks()
        .iter()
        .map(block_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn block_line(block: &Block) -> String {
    let pad = "  ".repeat(block.indent as usize);
    let text = &block.text;
    let body = match block.kind {
        BlockKind::Heading1 => format!("# {text}"),
        BlockKind::Heading2 => format!("## {text}"),
        BlockKind::Heading3 => format!("### {text}"),
        BlockKind::Bulleted => format!("- {text}"),
        BlockKind::Numbered => format!("1. {text}"),
        BlockKind::Todo if block.checked => format!("- [x] {text}"),
        BlockKind::Todo => format!("- [ ] {text}"),
        BlockKind::Quote => format!("> {text}"),
        BlockKind::Divider => "---".to_string(),
        BlockKind::Table => {
            let rows = block.rows.clone().unwrap_or_else(default_table_rows);
            let json = serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string());
            format!("{TABLE_PREFIX}{json}")
        }
        BlockKind::Image => format!("![{text}]({})", block.image_url()),
        _ => text.clone(),
    };
    format!("{pad}{body}")
}

/// Parse plain text back into a document.
///
/// Never fails: lines that match no marker become paragraphs, and an empty
/// input yields a single empty paragraph.
pub fn from_text(text: &str) -> Document {
    let blocks = if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').map(parse_line).collect()
    };
    Document::from_blocks(blocks)
}

fn parse_line(raw: &str) -> Block {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    let spaces = line.len() - line.trim_start_matches(' ').len();
    let indent = (spaces / 2).min(MAX_INDENT as usize) as u8;
    let body = &line[spaces..];

    if let Some(json) = body.strip_prefix(TABLE_PREFIX) {
        return parse_table(json, indent);
    }
    if let Some(caps) = IMAGE_LINE.captures(body) {
        let alt = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let url = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        return Block::new(BlockKind::Image, alt, indent).with_image(url, Default::default());
    }
    if body.trim_end() == "---" {
        return Block::new(BlockKind::Divider, "", indent);
    }

    const PREFIXES: [(&str, BlockKind); 4] = [
        ("# ", BlockKind::Heading1),
        ("## ", BlockKind::Heading2),
        ("### ", BlockKind::Heading3),
        ("> ", BlockKind::Quote),
    ];
    for (prefix, kind) in PREFIXES {
        if let Some(rest) = body.strip_prefix(prefix) {
            return Block::new(kind, rest, indent);
        }
    }

    if let Some(caps) = TODO_LINE.captures(body) {
        let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let checked = caps.get(1).is_some_and(|m| m.as_str().eq_ignore_ascii_case("x"));
        return Block::new(BlockKind::Todo, &body[end..], indent).with_checked(checked);
    }
    if let Some(rest) = body.strip_prefix("- ") {
        return Block::new(BlockKind::Bulleted, rest, indent);
    }
    if let Some(m) = NUMBERED_LINE.find(body) {
        return Block::new(BlockKind::Numbered, &body[m.end()..], indent);
    }

    Block::new(BlockKind::Text, line.trim(), indent)
}

fn parse_table(json: &str, indent: u8) -> Block {
    let mut block = Block::new(BlockKind::Table, "", indent);
    match serde_json::from_str::<Vec<Vec<String>>>(json) {
        Ok(rows) => {
            block.rows = Some(rows);
            normalize_table(&mut block);
        }
        Err(e) => {
            tracing::warn!("unreadable table line, using an empty table: {}", e);
        }
    }
    block
}

// ============================================================================
// Structured
// ============================================================================

/// The document as a JSON array of block objects.
pub fn to_structured(doc: &Document) -> serde_json::Value {
    serde_json::to_value(doc.blocks()).unwrap_or_else(|e| {
        tracing::warn!("failed to serialize blocks: {}", e);
        serde_json::Value::Array(Vec::new())
    })
}

pub fn to_structured_string(doc: &Document) -> String {
    serde_json::to_string(doc.blocks()).unwrap_or_else(|e| {
        tracing::warn!("failed to serialize blocks: {}", e);
        "[]".to_string()
    })
}

/// Rebuild a document from its structured form.
///
/// Returns `None` when the value is not an array of blocks. An empty array
/// gives a single empty paragraph.
pub fn from_structured(value: &serde_json::Value) -> Option<Document> {
    match Vec::<Block>::deserialize(value) {
        Ok(blocks) => Some(Document::from_blocks(blocks)),
        Err(e) => {
            tracing::warn!("malformed structured document: {}", e);
            None
        }
    }
}

/// Load a document from whatever persisted forms are available.
///
/// The structured form wins when it parses. Otherwise the plain text form is
/// used, and with neither the result is a fresh empty document.
pub fn load(structured: Option<&str>, text: Option<&str>) -> Document {
    if let Some(payload) = structured {
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(value) => {
                if let Some(doc) = from_structured(&value) {
                    return doc;
                }
            }
            Err(e) => tracing::warn!("structured payload is not JSON: {}", e),
        }
        if text.is_some() {
            tracing::info!("falling back to plain text");
        }
    }
    match text {
        Some(text) => from_text(text),
        None => Document::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
