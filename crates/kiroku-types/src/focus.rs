//! Focus targets handed back to the host after an edit.
//!
//! The engine never touches a selection or a DOM. Every operation that moves
//! the user's attention returns a [`Focus`]; the rendering layer turns it into
//! an actual caret.

use serde::{Deserialize, Serialize};

use crate::ids::BlockId;

/// Where inside the focused block the caret should land.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Caret {
    #[default]
    Start,
    End,
    /// Char offset into the block's text.
    At(usize),
}

/// The block (and caret position) the host should focus next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    pub block_id: BlockId,
    pub caret: Caret,
}

impl Focus {
    pub fn start(block_id: BlockId) -> Self {
        Self {
            block_id,
            caret: Caret::Start,
        }
    }

    pub fn end(block_id: BlockId) -> Self {
        Self {
            block_id,
            caret: Caret::End,
        }
    }

    pub fn at(block_id: BlockId, offset: usize) -> Self {
        Self {
            block_id,
            caret: Caret::At(offset),
        }
    }
}
