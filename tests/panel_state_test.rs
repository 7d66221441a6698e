mod common;

use std::sync::Arc;

use weaver_cockpit::{KeyValueStore, MemoryKeyValueStore, PanelVisibility, ScopedLocalStore};

#[tokio::test]
async fn test_toggle_survives_reopen() {
    let (_dir, db_path) = common::temp_db_path();

    {
        let store = common::sqlite_store(&db_path).await;
        let mut panels = PanelVisibility::new(ScopedLocalStore::new(store));
        let mut outline = panels.get_or_init("outline", true, Some("noir")).await;
        assert!(outline.is_open());
        assert!(!outline.toggle().await);
    }

    let store = common::sqlite_store(&db_path).await;
    let mut panels = PanelVisibility::new(ScopedLocalStore::new(Arc::clone(&store)));
    assert!(!panels.get_or_init("outline", true, Some("noir")).await.is_open());
    assert!(panels.get_or_init("chapters", true, Some("noir")).await.is_open());

    let raw = store.get("panelState:noir").await.unwrap().unwrap();
    assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), serde_json::json!({"outline": false}));
}

#[tokio::test]
async fn test_scopes_are_isolated() {
    let (_dir, db_path) = common::temp_db_path();
    let store = common::sqlite_store(&db_path).await;
    let mut panels = PanelVisibility::new(ScopedLocalStore::new(Arc::clone(&store)));

    panels.get_or_init("notes", false, Some("a")).await.toggle().await;
    panels.get_or_init("notes", false, None).await.toggle().await;
    panels.get_or_init("notes", false, None).await.toggle().await;

    assert!(panels.get_or_init("notes", false, Some("a")).await.is_open());
    assert!(!panels.get_or_init("notes", false, Some("b")).await.is_open());
    assert!(!panels.get_or_init("notes", false, None).await.is_open());

    assert!(store.get("panelState:b").await.unwrap().is_none());
    assert!(store.get("panelState").await.unwrap().is_some());
}

#[tokio::test]
async fn test_unavailable_store_keeps_session_state() {
    let memory = MemoryKeyValueStore::new();
    memory.fail_reads(true);
    memory.fail_writes(true);
    let mut panels = PanelVisibility::new(ScopedLocalStore::new(Arc::new(memory.clone())));

    let mut handle = panels.get_or_init("outline", true, Some("p1")).await;
    assert!(!handle.toggle().await);
    assert!(!panels.get_or_init("outline", true, Some("p1")).await.is_open());
    assert!(memory.is_empty());
}

#[tokio::test]
async fn test_corrupt_entry_reads_as_defaults() {
    let memory = MemoryKeyValueStore::new();
    memory.set("panelState:p1", "{not json").await.unwrap();
    let mut panels = PanelVisibility::new(ScopedLocalStore::new(Arc::new(memory)));

    assert!(panels.get_or_init("outline", true, Some("p1")).await.is_open());
    assert!(!panels.get_or_init("notes", false, Some("p1")).await.is_open());
}
