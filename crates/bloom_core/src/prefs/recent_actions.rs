//! Most-recently used command ids for the command palette.

use crate::prefs::log_storage_error;
use crate::prefs::store::PreferenceStore;
use log::warn;
use std::sync::Arc;

pub const RECENT_ACTIONS_KEY: &str = "bloom:recent-actions";
pub const MAX_RECENT_ACTIONS: usize = 10;

/// Recent action ids, most recent first, without duplicates.
pub struct RecentActions {
    store: Arc<dyn PreferenceStore>,
    cached: Option<Vec<String>>,
}

impl RecentActions {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            cached: None,
        }
    }

    pub fn list(&mut self) -> Vec<String> {
        if let Some(actions) = &self.cached {
            return actions.clone();
        }
        let stored =
            log_storage_error(RECENT_ACTIONS_KEY, "read", self.store.get(RECENT_ACTIONS_KEY))
                .flatten();
        let Some(text) = stored else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<String>>(&text) {
            Ok(actions) => {
                self.cached = Some(actions.clone());
                actions
            }
            Err(err) => {
                warn!(
                    "event=prefs_decode module=prefs status=error key={RECENT_ACTIONS_KEY} error={err}"
                );
                Vec::new()
            }
        }
    }

    /// Moves `id` to the front, keeping at most [`MAX_RECENT_ACTIONS`].
    pub fn record(&mut self, id: &str) {
        let mut actions = self.list();
        actions.retain(|item| item != id);
        actions.insert(0, id.to_string());
        actions.truncate(MAX_RECENT_ACTIONS);

        match serde_json::to_string(&actions) {
            Ok(encoded) => {
                log_storage_error(
                    RECENT_ACTIONS_KEY,
                    "write",
                    self.store.set(RECENT_ACTIONS_KEY, &encoded),
                );
            }
            Err(err) => warn!(
                "event=prefs_encode module=prefs status=error key={RECENT_ACTIONS_KEY} error={err}"
            ),
        }
        self.cached = Some(actions);
    }

    pub fn clear(&mut self) {
        self.cached = None;
        log_storage_error(
            RECENT_ACTIONS_KEY,
            "remove",
            self.store.remove(RECENT_ACTIONS_KEY),
        );
    }
}
