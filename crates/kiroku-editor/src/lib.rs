//! Editor session for kiroku documents.
//!
//! Wraps a [`kiroku_doc::Document`] with the state a host needs around it:
//!
//! - [`CommandPalette`]: the `/` menu, as an explicit state machine
//! - [`Autosave`]: debounced flush scheduling with a visible [`SaveStatus`]
//! - [`PersistenceAdapter`]: where snapshots go ([`MemoryStore`], [`FileStore`])
//! - [`EditorConfig`]: per-host presets and RON config
//!
//! [`EditorSession`] ties them together. Hosts forward events and get back
//! the [`Focus`](kiroku_types::Focus) to apply.

pub mod autosave;
pub mod config;
pub mod palette;
pub mod persistence;
pub mod session;

pub use autosave::{Autosave, DEFAULT_AUTOSAVE_DELAY, SaveStatus};
pub use config::{ConfigError, EditorConfig, HostKind};
pub use palette::{
    Anchor, ClickTarget, CommandPalette, CommandSet, OpenPalette, PaletteCommand, PaletteKey,
    PaletteOutcome, Trigger,
};
pub use persistence::{FileStore, MemoryStore, PersistError, PersistenceAdapter, Stored};
pub use session::{EditorKey, EditorSession, KeyOutcome, Step};

pub use kiroku_doc::Snapshot;

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistError>;
