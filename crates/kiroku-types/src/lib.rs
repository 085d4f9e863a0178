//! Block identity and content types for kiroku.
//!
//! This crate is the leaf of the workspace: typed block ids, the block kinds
//! and their auxiliary fields, and the focus values the edit engine hands back
//! to its host. It has **no internal kiroku dependencies**.
//!
//! # Key Types
//!
//! |-------------------|----------------------------------------------|
//! | Type              | Purpose                                      |
//! |-------------------|----------------------------------------------|
//! | [`BlockId`]       | Opaque, unique, stable block address         |
//! | [`BlockKind`]     | What a block is (text, heading1, table, ...) |
//! | [`Block`]         | One unit of content + kind-specific fields   |
//! | [`BlockStyle`]    | Style flag bag, orthogonal to kind           |
//! | [`Focus`]         | Block + caret the host should focus next     |
//! |-------------------|----------------------------------------------|

pub mod block;
pub mod focus;
pub mod ids;
pub mod value;

// Re-export primary types at crate root for convenience.
pub use block::{
    Alignment, Block, BlockKind, BlockStyle, CalloutKind, DEFAULT_TABLE_COLUMNS, ImageAttrs,
    ImageSize, MAX_INDENT, Priority, default_table_rows,
};
pub use focus::{Caret, Focus};
pub use ids::BlockId;
pub use value::{ValueError, validate_date, validate_time};
