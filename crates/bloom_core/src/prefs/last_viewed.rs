//! Last opened document id.

use crate::prefs::log_storage_error;
use crate::prefs::store::PreferenceStore;
use std::sync::Arc;

pub const LAST_VIEWED_KEY: &str = "bloom:lastViewedDocId";

/// Cached last-viewed id backed by a preference store.
pub struct LastViewed {
    store: Arc<dyn PreferenceStore>,
    cached: Option<String>,
}

impl LastViewed {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            cached: None,
        }
    }

    /// Records `id` in memory and in the store.
    pub fn set(&mut self, id: &str) {
        self.cached = Some(id.to_string());
        log_storage_error(LAST_VIEWED_KEY, "write", self.store.set(LAST_VIEWED_KEY, id));
    }

    /// Cached id, else the stored one.
    pub fn get(&self) -> Option<String> {
        if let Some(id) = &self.cached {
            return Some(id.clone());
        }
        log_storage_error(LAST_VIEWED_KEY, "read", self.store.get(LAST_VIEWED_KEY)).flatten()
    }

    /// Forgets the id in memory and in the store.
    pub fn clear(&mut self) {
        self.cached = None;
        log_storage_error(LAST_VIEWED_KEY, "remove", self.store.remove(LAST_VIEWED_KEY));
    }
}
