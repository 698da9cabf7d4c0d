//! Small persisted user preferences.
//!
//! # Responsibility
//! - Remember the last opened document, recent actions and theme choice.
//! - Keep preference state in objects over an injected `PreferenceStore`.
//!
//! # Invariants
//! - Preference reads and writes never fail the caller: storage errors are
//!   logged at `warn` and the in-memory value is used.

pub mod last_viewed;
pub mod recent_actions;
pub mod store;
pub mod theme;

use log::warn;
use store::PreferenceResult;

/// Logs and discards a storage failure.
pub(crate) fn log_storage_error<T>(
    key: &str,
    operation: &str,
    result: PreferenceResult<T>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("event=prefs_{operation} module=prefs status=error key={key} error={err}");
            None
        }
    }
}
