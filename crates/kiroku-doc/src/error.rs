//! Error types for edit operations.

use thiserror::Error;

use kiroku_types::{BlockKind, ValueError};

/// Why an edit was refused.
///
/// Every variant means the document was left exactly as it was. Hosts are
/// expected to gate calls on current state, so these are programming slips,
/// not user-facing failures; the editor session logs and drops them.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    /// Block index past the end of the document.
    #[error("block index {index} out of range (document has {len} blocks)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Operation not supported on this block kind.
    ///
    /// For example, `add_row` is only supported on Table blocks.
    #[error("{op} is not supported on {kind} blocks")]
    UnsupportedKind { op: &'static str, kind: BlockKind },

    /// Table cell address outside the current table shape.
    #[error("cell ({row}, {col}) out of range for {rows}x{cols} table")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Deleting would leave a table without rows or columns.
    #[error("a table must keep at least one {0}")]
    TableTooSmall(&'static str),

    /// The first block has nothing to merge into.
    #[error("block 0 has no previous block to merge into")]
    NoPreviousBlock,

    /// Merging would throw away text or table rows that have nowhere to go.
    #[error("merging block {index} would discard its content")]
    WouldDropContent { index: usize },

    /// Date or time value rejected.
    #[error(transparent)]
    InvalidValue(#[from] ValueError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EditError::IndexOutOfRange { index: 9, len: 3 };
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('3'));

        let err = EditError::UnsupportedKind {
            op: "add_row",
            kind: BlockKind::Quote,
        };
        assert_eq!(err.to_string(), "add_row is not supported on quote blocks");

        let err = EditError::WouldDropContent { index: 2 };
        assert_eq!(err.to_string(), "merging block 2 would discard its content");

        let err = EditError::TableTooSmall("column");
        assert!(err.to_string().ends_with("one column"));
    }

    #[test]
    fn test_value_error_converts() {
        let err: EditError = ValueError::Time("25:00".into()).into();
        assert!(err.to_string().contains("25:00"));
    }
}
