use bloom_core::{
    DocumentManager, FileDocumentStore, JsonFilePreferenceStore, LastViewed, ManualClock,
    PreferenceStore, RecentActions, Theme, ThemePreference,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

#[test]
fn last_viewed_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("Bloom");
    let prefs_path = docs.join("preferences.json");
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 7, 0, 0).unwrap()));

    let open = || {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(JsonFilePreferenceStore::new(&prefs_path));
        DocumentManager::new(FileDocumentStore::new(&docs), LastViewed::new(prefs))
            .with_clock(clock.clone())
    };

    let mut first_run = open();
    first_run.init();
    let first = first_run.active_document_id().unwrap().to_string();
    first_run.update_title("First");
    assert!(first_run.flush());
    let second = first_run.create_new_document();
    first_run.update_title("Second");
    assert!(first_run.flush());
    assert!(first_run.select_document(&first));

    let mut second_run = open();
    second_run.init();
    assert_eq!(second_run.active_document_id(), Some(first.as_str()));
    assert_eq!(second_run.documents().len(), 2);
    assert!(second_run.documents().iter().any(|doc| doc.id == second));
}

#[test]
fn recent_actions_and_theme_share_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let store: Arc<dyn PreferenceStore> = Arc::new(JsonFilePreferenceStore::new(&path));

    let mut recent = RecentActions::new(store.clone());
    recent.record("export");
    recent.record("new-document");
    recent.record("export");
    let mut theme = ThemePreference::new(store.clone());
    theme.set(Theme::Dark);

    let reopened: Arc<dyn PreferenceStore> = Arc::new(JsonFilePreferenceStore::new(&path));
    assert_eq!(
        RecentActions::new(reopened.clone()).list(),
        vec!["export", "new-document"]
    );
    assert_eq!(ThemePreference::new(reopened).get(), Some(Theme::Dark));
}
