//! Core logic for the Bloom writing app.
//! This crate owns the document model, its converters, storage and the
//! autosave lifecycle; hosts only render and forward input.

pub mod clock;
pub mod config;
pub mod convert;
pub mod export;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod repo;
pub mod search;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ConfigResult, CoreConfig};
pub use convert::html::clean_html;
pub use convert::markdown::to_markdown;
pub use convert::text_stats::{count_words, estimate_read_time};
pub use convert::title::extract_title;
pub use export::format::{ExportFormat, HtmlExport, MarkdownExport};
pub use export::registry::{ExportRegistry, ExportRegistryError, FileFilter};
pub use export::service::{
    copy_as_markdown, derive_filename, export_to_file, ExportError, ExportOutcome, ExportResult,
    MemoryClipboard, TextClipboard,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::document::{Document, DocumentId, DocumentStatus, SidebarSummary, Timestamp};
pub use model::node::{Mark, Node};
pub use prefs::last_viewed::LastViewed;
pub use prefs::recent_actions::RecentActions;
pub use prefs::store::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceResult,
    PreferenceStore,
};
pub use prefs::theme::{Theme, ThemePreference};
pub use repo::codec::{deserialize_document, serialize_document, DocumentCodecError};
pub use repo::document_store::{
    DocumentMeta, DocumentStore, FileDocumentStore, MemoryDocumentStore, StoreError, StoreResult,
};
pub use search::document_filter::{
    collect_tags, filter_by_tag, search_by_title, sort_by_modified, SidebarQuery,
};
pub use search::relative_time::format_relative_time;
pub use service::document_manager::{
    DocumentManager, SaveStatus, SidebarItem, DEFAULT_AUTOSAVE_DELAY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
