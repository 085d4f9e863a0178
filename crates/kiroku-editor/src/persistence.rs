//! Where snapshots go.
//!
//! The session hands every flush to a [`PersistenceAdapter`]. Failures are
//! reported back as a save status; the in-memory document is never rolled
//! back.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use kiroku_doc::Snapshot;

use crate::Result;

/// Errors from a persistence adapter.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted forms found at load time. Either may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stored {
    pub structured: Option<String>,
    pub text: Option<String>,
}

pub trait PersistenceAdapter {
    /// Write both forms of the document.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Read back whatever was last saved.
    fn load(&self) -> Result<Stored> {
        Ok(Stored::default())
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// Keeps every snapshot in memory. Useful for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saves: Vec<Snapshot>,
    initial: Stored,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose first load returns `stored`.
    pub fn with_stored(stored: Stored) -> Self {
        Self {
            initial: stored,
            ..Self::default()
        }
    }

    /// Make subsequent saves fail with `message` (or succeed again with `None`).
    pub fn set_failure(&mut self, message: Option<&str>) {
        self.failure = message.map(str::to_string);
    }

    pub fn saves(&self) -> &[Snapshot] {
        &self.saves
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.saves.last()
    }
}

impl PersistenceAdapter for MemoryStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(PersistError::Unavailable(message.clone()));
        }
        self.saves.push(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Stored> {
        Ok(match self.saves.last() {
            Some(last) => Stored {
                structured: Some(last.structured.clone()),
                text: Some(last.text.clone()),
            },
            None => self.initial.clone(),
        })
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// Writes `<stem>.md` (plain text) and `<stem>.json` (structured) side by side.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    stem: String,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Store for `path` with its extension removed, e.g. `notes/plan.md` →
    /// `notes/plan.{md,json}`.
    pub fn for_path(path: &Path) -> Self {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Self::new(dir, stem)
    }

    pub fn text_path(&self) -> PathBuf {
        self.dir.join(format!("{}.md", self.stem))
    }

    pub fn structured_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.stem))
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl PersistenceAdapter for FileStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.text_path(), &snapshot.text)?;
        std::fs::write(self.structured_path(), &snapshot.structured)?;
        tracing::debug!("wrote {} and {}", self.text_path().display(), self.structured_path().display());
        Ok(())
    }

    fn load(&self) -> Result<Stored> {
        Ok(Stored {
            structured: read_optional(&self.structured_path())?,
            text: read_optional(&self.text_path())?,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
