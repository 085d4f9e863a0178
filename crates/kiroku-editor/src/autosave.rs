//! Debounced save scheduling.
//!
//! Every edit re-arms a single deadline `delay` after the edit. When the host
//! ticks past it the session flushes the latest snapshot, so a burst of edits
//! produces one save. Time is passed in explicitly; nothing here sleeps or
//! spawns.

use std::time::{Duration, Instant};

use crate::PersistError;

/// Default quiet period before an automatic save.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1500);

/// Save state shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// Edits not yet written.
    Dirty,
    Saving,
    /// Last save failed; edits are still in memory.
    Error(String),
}

impl SaveStatus {
    /// Whether there are edits the store has not seen.
    pub fn has_unsaved(&self) -> bool {
        !matches!(self, SaveStatus::Saved)
    }
}

#[derive(Debug)]
pub struct Autosave {
    delay: Duration,
    status: SaveStatus,
    last_edit_at: Option<Instant>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            status: SaveStatus::Saved,
            last_edit_at: None,
        }
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When the pending save fires, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_edit_at.map(|t| t + self.delay)
    }

    /// Record an edit at `now`, pushing the deadline back.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.last_edit_at = Some(now);
        self.status = SaveStatus::Dirty;
    }

    /// Whether the debounce window has passed with edits pending.
    pub fn due(&self, now: Instant) -> bool {
        self.status == SaveStatus::Dirty && self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Start a save. Returns false when there is nothing to write or a
    /// save is already running.
    pub fn begin(&mut self) -> bool {
        match self.status {
            SaveStatus::Saved | SaveStatus::Saving => false,
            SaveStatus::Dirty | SaveStatus::Error(_) => {
                self.status = SaveStatus::Saving;
                self.last_edit_at = None;
                true
            }
        }
    }

    /// Record the outcome of the save started by [`begin`](Self::begin).
    pub fn finish(&mut self, result: Result<(), PersistError>) {
        if self.status != SaveStatus::Saving {
            tracing::warn!("save finished while not saving (status {:?})", self.status);
        }
        self.status = match result {
            Ok(()) => SaveStatus::Saved,
            Err(e) => SaveStatus::Error(e.to_string()),
        };
    }

    /// Drop the pending deadline without saving.
    pub fn cancel(&mut self) {
        self.last_edit_at = None;
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_edits_coalesce_into_one_deadline() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(1000 * MS);

        autosave.mark_dirty(t0);
        autosave.mark_dirty(t0 + 600 * MS);
        assert!(!autosave.due(t0 + 1000 * MS));
        assert!(autosave.due(t0 + 1600 * MS));
        assert_eq!(autosave.deadline(), Some(t0 + 1600 * MS));
    }

    #[test]
    fn test_clean_state_is_never_due() {
        let autosave = Autosave::default();
        assert_eq!(autosave.status(), &SaveStatus::Saved);
        assert!(!autosave.due(Instant::now() + Duration::from_secs(60)));
        assert!(!autosave.status().has_unsaved());
    }

    #[test]
    fn test_save_cycle() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(10 * MS);
        autosave.mark_dirty(t0);

        assert!(autosave.begin());
        assert_eq!(autosave.status(), &SaveStatus::Saving);
        assert!(!autosave.begin());
        assert_eq!(autosave.deadline(), None);

        autosave.finish(Ok(()));
        assert_eq!(autosave.status(), &SaveStatus::Saved);
        assert!(!autosave.begin());
    }

    #[test]
    fn test_failed_save_keeps_edits_pending() {
        let mut autosave = Autosave::default();
        autosave.mark_dirty(Instant::now());
        autosave.begin();
        autosave.finish(Err(PersistError::Unavailable("disk full".into())));

        assert!(matches!(autosave.status(), SaveStatus::Error(msg) if msg.contains("disk full")));
        assert!(autosave.status().has_unsaved());
        // No automatic retry; an explicit save may try again.
        assert!(!autosave.due(Instant::now() + Duration::from_secs(60)));
        assert!(autosave.begin());
    }

    #[test]
    fn test_cancel_disarms() {
        let t0 = Instant::now();
        let mut autosave = Autosave::new(10 * MS);
        autosave.mark_dirty(t0);
        autosave.cancel();
        assert!(!autosave.due(t0 + Duration::from_secs(1)));
        assert_eq!(autosave.status(), &SaveStatus::Dirty);
    }
}
