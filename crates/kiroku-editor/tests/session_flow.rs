//! End-to-end session behaviour: debounce, save failures, teardown, and
//! reopening from disk.

use std::time::{Duration, Instant};

use kiroku_doc::EditOp;
use kiroku_editor::{
    Anchor, EditorConfig, EditorKey, EditorSession, FileStore, HostKind, KeyOutcome, MemoryStore,
    SaveStatus, Stored,
};
use kiroku_types::{BlockKind, Caret};

fn test_config() -> EditorConfig {
    EditorConfig {
        autosave_delay_ms: 1000,
        ..EditorConfig::default()
    }
}

fn later() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

#[test]
fn test_burst_of_edits_saves_once() {
    let mut session = EditorSession::open(test_config(), MemoryStore::new());
    for text in ["h", "he", "hel", "hell", "hello"] {
        session.set_text(0, text, Anchor::default());
    }

    assert!(!session.tick(Instant::now()));
    assert!(session.adapter().saves().is_empty());

    assert!(session.tick(later()));
    assert_eq!(session.adapter().saves().len(), 1);
    assert_eq!(session.adapter().last().unwrap().text, "hello");
    assert_eq!(session.save_status(), &SaveStatus::Saved);

    // Nothing new to write.
    assert!(!session.tick(later()));
    assert_eq!(session.adapter().saves().len(), 1);
}

#[test]
fn test_save_now_flushes_immediately() {
    let mut session = EditorSession::open(test_config(), MemoryStore::new());
    session.set_text(0, "draft", Anchor::default());
    assert!(session.save_deadline().is_some());

    assert!(session.save_now());
    assert_eq!(session.adapter().saves().len(), 1);
    assert_eq!(session.save_deadline(), None);
    assert!(!session.tick(later()));
}

#[test]
fn test_failed_save_keeps_document_and_can_retry() {
    let mut session = EditorSession::open(test_config(), MemoryStore::new());
    session.adapter_mut().set_failure(Some("network down"));
    session.set_text(0, "[ ] call back", Anchor::default());

    assert!(session.tick(later()));
    assert!(matches!(session.save_status(), SaveStatus::Error(msg) if msg.contains("network down")));
    assert_eq!(session.document().blocks()[0].kind, BlockKind::Todo);

    session.adapter_mut().set_failure(None);
    assert!(session.save_now());
    assert_eq!(session.save_status(), &SaveStatus::Saved);
    assert_eq!(session.adapter().last().unwrap().text, "- [ ] call back\n");
}

#[test]
fn test_dispose_cancels_pending_save() {
    let mut session = EditorSession::open(test_config(), MemoryStore::new());
    session.set_text(0, "unsaved", Anchor::default());
    session.dispose();

    assert!(session.is_disposed());
    assert_eq!(session.save_deadline(), None);
    assert!(!session.tick(later()));
    assert!(!session.save_now());
    assert!(session.adapter().saves().is_empty());
}

#[test]
fn test_open_prefers_structured_and_falls_back_to_text() {
    let stored = Stored {
        structured: Some("not json".to_string()),
        text: Some("# Agenda\n1. intro\n1. budget".to_string()),
    };
    let session = EditorSession::open(EditorConfig::default(), MemoryStore::with_stored(stored));
    let doc = session.document();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.ordinals(), vec![None, Some(1), Some(2)]);
}

#[test]
fn test_file_store_reopen_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path(), "meeting");

    let mut session = EditorSession::open(EditorConfig::for_host(HostKind::Meeting), store.clone());
    session.set_text(0, "Standup", Anchor::default());
    session.apply(&EditOp::ChangeType {
        index: 0,
        kind: BlockKind::Callout,
    });
    let KeyOutcome::Handled { .. } = session.key(0, EditorKey::Enter, Caret::End) else {
        panic!("enter is handled");
    };
    session.apply(&EditOp::ChangeType {
        index: 1,
        kind: BlockKind::Date,
    });
    session.apply(&EditOp::SetValue {
        index: 1,
        value: "2024-06-03".to_string(),
    });
    assert!(session.save_now());
    let saved = session.document().clone();
    session.dispose();

    let text = std::fs::read_to_string(store.text_path()).unwrap();
    assert_eq!(text, "Standup\n");

    let reopened = EditorSession::open(EditorConfig::for_host(HostKind::Meeting), store);
    assert_eq!(reopened.document().blocks(), saved.blocks());
    assert_eq!(reopened.document().blocks()[1].value.as_deref(), Some("2024-06-03"));
}

#[test]
fn test_rich_host_palette_offers_extras() {
    let mut session = EditorSession::open(EditorConfig::for_host(HostKind::Project), MemoryStore::new());
    session.click_add(0, Anchor::default());
    let date = session
        .palette()
        .commands()
        .iter()
        .position(|c| c.kind == BlockKind::Date)
        .expect("rich hosts offer dates");
    session.click_palette(date);
    assert_eq!(session.document().blocks()[0].kind, BlockKind::Date);

    let goal = EditorSession::open(EditorConfig::for_host(HostKind::Goal), MemoryStore::new());
    assert!(goal.palette().commands().iter().all(|c| c.kind != BlockKind::Date));
}
