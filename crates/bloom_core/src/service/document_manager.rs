//! Active-document lifecycle and debounced autosave.
//!
//! # Responsibility
//! - Own the single active editing context and the sidebar summary list.
//! - Coalesce rapid edits into one save per quiet period.
//! - Degrade to in-memory editing when the store is unavailable.
//!
//! # Invariants
//! - Newly active documents start `Saved`; any content/title/subtitle edit
//!   moves to `Unsaved` and (re)schedules the autosave.
//! - `modified_at` only changes on a successful save and never decreases.
//! - `created_at` is written back exactly as it was loaded.
//! - A pending save belongs to the document that was edited. Switching the
//!   active document flushes it first; deleting that document cancels it.
//! - Store failures are logged and swallowed; they never panic or surface as
//!   errors to the caller.
//!
//! # See also
//! - `search::document_filter` for the sidebar pipeline.

use crate::clock::{Clock, SystemClock};
use crate::convert::text_stats::document_word_count;
use crate::convert::title::extract_title;
use crate::model::document::{
    new_document_id, normalize_tags, Document, DocumentId, DocumentStatus, SidebarSummary,
    Timestamp, DEFAULT_TITLE,
};
use crate::model::node::Node;
use crate::prefs::last_viewed::LastViewed;
use crate::repo::document_store::{DocumentMeta, DocumentStore, StoreResult};
use crate::search::document_filter::{collect_tags, SidebarQuery};
use crate::search::relative_time::format_relative_time;
use crate::service::debounce::Debouncer;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Quiet period after the last edit before autosave fires.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Unsaved,
}

impl SaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Unsaved => "unsaved",
        }
    }
}

/// Sidebar row with a display-ready modified label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub id: DocumentId,
    pub title: String,
    pub modified_at_label: String,
    pub tags: Vec<String>,
}

/// Live state of the document open in the editor.
#[derive(Debug, Clone)]
struct ActiveDocument {
    id: DocumentId,
    created_at: Timestamp,
    /// Last persisted `modified_at`, used to keep saves monotonic.
    modified_at: Timestamp,
    tags: Vec<String>,
    content: Node,
    title: String,
    subtitle: String,
    status: DocumentStatus,
    extra: Map<String, Value>,
}

impl ActiveDocument {
    fn hydrate(id: DocumentId, doc: Document) -> Self {
        Self {
            id,
            created_at: doc.created_at,
            modified_at: doc.modified_at,
            tags: doc.tags,
            content: doc.content,
            title: doc.title,
            subtitle: doc.subtitle,
            status: doc.status,
            extra: doc.extra,
        }
    }

    fn fresh(id: DocumentId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: Timestamp::from_datetime(now),
            modified_at: Timestamp::from_datetime(now),
            tags: Vec::new(),
            content: Node::empty_doc(),
            title: String::new(),
            subtitle: String::new(),
            status: DocumentStatus::Draft,
            extra: Map::new(),
        }
    }

    /// Explicit title, else extracted title, else `"Untitled"`.
    fn resolved_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        let extracted = extract_title(&self.content);
        if extracted.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            extracted
        }
    }
}

/// Document lifecycle manager over a [`DocumentStore`].
pub struct DocumentManager<S: DocumentStore> {
    store: S,
    last_viewed: LastViewed,
    clock: Arc<dyn Clock>,
    autosave: Debouncer<DocumentId>,
    documents: Vec<SidebarSummary>,
    active: Option<ActiveDocument>,
    save_status: SaveStatus,
    content_version: u64,
    search_query: String,
    tag_filter: Option<String>,
    collapsed: bool,
}

impl<S: DocumentStore> DocumentManager<S> {
    /// Creates a manager using the system clock and the default autosave delay.
    pub fn new(store: S, last_viewed: LastViewed) -> Self {
        Self {
            store,
            last_viewed,
            clock: Arc::new(SystemClock),
            autosave: Debouncer::new(DEFAULT_AUTOSAVE_DELAY),
            documents: Vec::new(),
            active: None,
            save_status: SaveStatus::Saved,
            content_version: 0,
            search_query: String::new(),
            tag_filter: None,
            collapsed: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave = Debouncer::new(delay);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the sidebar and opens the last viewed, first listed or a new document.
    pub fn init(&mut self) {
        let ids = self.refresh_document_list();
        let last = self.last_viewed.get();

        if let Some(last) = last.filter(|id| ids.contains(id)) {
            if self.select_document(&last) {
                return;
            }
        }
        if let Some(first) = ids.first() {
            if self.select_document(first) {
                return;
            }
        }
        self.create_new_document();
    }

    /// Rebuilds summaries from the store and returns the listed ids.
    ///
    /// Documents that fail to load appear as placeholders. When listing
    /// itself fails the previous summaries are kept and no ids are returned.
    pub fn refresh_document_list(&mut self) -> Vec<DocumentId> {
        let metas = match self.store.list() {
            Ok(metas) => metas,
            Err(err) => {
                warn!("event=document_refresh module=manager status=error error={err}");
                return Vec::new();
            }
        };

        let now = self.clock.now();
        let mut summaries = Vec::with_capacity(metas.len());
        let mut placeholders = 0usize;
        for meta in &metas {
            match self.store.load(&meta.path) {
                Ok(doc) => summaries.push(doc.summary(meta.id.clone())),
                Err(err) => {
                    placeholders += 1;
                    warn!(
                        "event=document_load module=manager status=error id={} error={err}",
                        meta.id
                    );
                    summaries.push(SidebarSummary::placeholder(meta.id.clone(), now));
                }
            }
        }

        debug!(
            "event=document_refresh module=manager status=ok count={} placeholders={placeholders}",
            summaries.len()
        );
        let ids = summaries.iter().map(|summary| summary.id.clone()).collect();
        self.documents = summaries;
        ids
    }

    /// Opens a stored document, flushing any pending save first.
    ///
    /// Returns `false` and keeps the current document when `id` is not
    /// listed or cannot be loaded.
    pub fn select_document(&mut self, id: &str) -> bool {
        self.flush();

        let loaded = match self.find_meta(id) {
            Ok(Some(meta)) => self.store.load(&meta.path),
            Ok(None) => {
                debug!("event=document_select module=manager status=missing id={id}");
                return false;
            }
            Err(err) => Err(err),
        };
        let doc = match loaded {
            Ok(doc) => doc,
            Err(err) => {
                warn!("event=document_select module=manager status=error id={id} error={err}");
                return false;
            }
        };

        self.activate(ActiveDocument::hydrate(id.to_string(), doc));
        info!("event=document_select module=manager status=ok id={id}");
        true
    }

    /// Starts a new, not yet persisted document and returns its id.
    pub fn create_new_document(&mut self) -> DocumentId {
        self.flush();

        let id = new_document_id();
        let now = self.clock.now();
        self.documents.insert(
            0,
            SidebarSummary {
                id: id.clone(),
                title: DEFAULT_TITLE.to_string(),
                modified_at: now,
                tags: Vec::new(),
            },
        );
        self.activate(ActiveDocument::fresh(id.clone(), now));
        info!("event=document_create module=manager status=ok id={id}");
        id
    }

    /// Deletes a document; clears the editor when it was active.
    pub fn delete_document(&mut self, id: &str) -> bool {
        if let Err(err) = self.store.delete(id) {
            warn!("event=document_delete module=manager status=error id={id} error={err}");
            return false;
        }

        self.documents.retain(|summary| summary.id != id);
        if self.autosave.cancel_if(&id.to_string()) {
            debug!("event=autosave_cancel module=manager status=ok id={id}");
        }
        if self.active_document_id() == Some(id) {
            self.active = None;
            self.save_status = SaveStatus::Saved;
        }
        info!("event=document_delete module=manager status=ok id={id}");
        true
    }

    /// Replaces a document's tags and writes them through to storage.
    ///
    /// Returns whether the stored file was updated. A document that has never
    /// been saved keeps its tags in memory until its first save.
    pub fn update_tags<I, T>(&mut self, id: &str, tags: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags = normalize_tags(tags);
        if let Some(active) = self.active.as_mut().filter(|active| active.id == id) {
            active.tags = tags.clone();
        }
        if let Some(summary) = self.documents.iter_mut().find(|summary| summary.id == id) {
            summary.tags = tags.clone();
        }

        match self.write_tags(id, &tags) {
            Ok(Some(modified_at)) => {
                if let Some(summary) = self.documents.iter_mut().find(|summary| summary.id == id)
                {
                    summary.modified_at = modified_at.instant();
                }
                if let Some(active) = self.active.as_mut().filter(|active| active.id == id) {
                    active.modified_at = modified_at;
                }
                debug!(
                    "event=tags_update module=manager status=ok id={id} count={}",
                    tags.len()
                );
                true
            }
            Ok(None) => {
                debug!("event=tags_update module=manager status=unsaved id={id}");
                false
            }
            Err(err) => {
                warn!("event=tags_update module=manager status=error id={id} error={err}");
                false
            }
        }
    }

    /// Records new editor content.
    pub fn update_content(&mut self, content: Node) {
        let content = if content.is_doc() {
            content
        } else {
            Node::doc(vec![content])
        };
        let Some(active) = self.active.as_mut() else {
            debug!("event=content_update module=manager status=skip reason=no_active_document");
            return;
        };
        active.content = content;
        self.content_version += 1;
        self.mark_dirty();
    }

    /// Records a new explicit title and shows it in the sidebar immediately.
    pub fn update_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let display = if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title.clone()
        };
        active.title = title;
        let id = active.id.clone();
        if let Some(summary) = self.documents.iter_mut().find(|summary| summary.id == id) {
            summary.title = display;
        }
        self.mark_dirty();
    }

    pub fn update_subtitle(&mut self, subtitle: impl Into<String>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.subtitle = subtitle.into();
        self.mark_dirty();
    }

    /// Fires the autosave when its quiet period has elapsed.
    ///
    /// Returns whether a save succeeded.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.instant();
        match self.autosave.take_due(now) {
            Some(id) => self.perform_save(&id),
            None => false,
        }
    }

    /// Saves a pending edit immediately.
    pub fn flush(&mut self) -> bool {
        match self.autosave.take_pending() {
            Some(id) => self.perform_save(&id),
            None => false,
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Time until the pending autosave is due.
    pub fn autosave_remaining(&self) -> Option<Duration> {
        self.autosave.remaining(self.clock.instant())
    }

    pub fn active_document_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.id.as_str())
    }

    /// Explicit title as typed; empty when none is set.
    pub fn active_title(&self) -> &str {
        self.active.as_ref().map_or("", |active| active.title.as_str())
    }

    pub fn active_subtitle(&self) -> &str {
        self.active
            .as_ref()
            .map_or("", |active| active.subtitle.as_str())
    }

    pub fn active_created_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|active| active.created_at.instant())
    }

    pub fn active_content(&self) -> Option<&Node> {
        self.active.as_ref().map(|active| &active.content)
    }

    /// Tags of the active document as shown in the sidebar.
    pub fn active_document_tags(&self) -> Vec<String> {
        let Some(id) = self.active_document_id() else {
            return Vec::new();
        };
        self.documents
            .iter()
            .find(|summary| summary.id == id)
            .map(|summary| summary.tags.clone())
            .unwrap_or_default()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    /// Counter bumped on every content update.
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// Word count of the active title and body.
    pub fn word_count(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |active| document_word_count(&active.title, &active.content))
    }

    /// Unfiltered summaries in listing order.
    pub fn documents(&self) -> &[SidebarSummary] {
        &self.documents
    }

    pub fn all_tags(&self) -> Vec<String> {
        collect_tags(&self.documents)
    }

    /// Sidebar rows after tag filter, title search and recency sort.
    pub fn filtered_documents(&self) -> Vec<SidebarItem> {
        let now = self.clock.now();
        SidebarQuery::new(self.tag_filter.clone(), self.search_query.clone())
            .apply(&self.documents)
            .into_iter()
            .map(|summary| SidebarItem {
                modified_at_label: format_relative_time(summary.modified_at, now),
                id: summary.id,
                title: summary.title,
                tags: summary.tags,
            })
            .collect()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn active_tag_filter(&self) -> Option<&str> {
        self.tag_filter.as_deref()
    }

    pub fn set_active_tag_filter(&mut self, tag: Option<String>) {
        self.tag_filter = tag.filter(|tag| !tag.is_empty());
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle_collapse(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Snapshot of the active document as it would be saved now.
    pub fn active_document(&self) -> Option<Document> {
        self.active
            .as_ref()
            .map(|active| self.build_document(active, active.modified_at.clone()))
    }

    fn activate(&mut self, active: ActiveDocument) {
        self.last_viewed.set(&active.id);
        self.active = Some(active);
        self.save_status = SaveStatus::Saved;
    }

    fn mark_dirty(&mut self) {
        let Some(id) = self.active_document_id().map(str::to_string) else {
            return;
        };
        self.save_status = SaveStatus::Unsaved;
        self.autosave.trigger(id, self.clock.instant());
    }

    fn find_meta(&self, id: &str) -> StoreResult<Option<DocumentMeta>> {
        Ok(self.store.list()?.into_iter().find(|meta| meta.id == id))
    }

    /// Loads the stored document, replaces its tags and saves it back.
    fn write_tags(&self, id: &str, tags: &[String]) -> StoreResult<Option<Timestamp>> {
        let Some(meta) = self.find_meta(id)? else {
            return Ok(None);
        };
        let mut doc = self.store.load(&meta.path)?;
        doc.tags = tags.to_vec();
        doc.modified_at = doc.modified_at.advanced_to(self.clock.now());
        self.store.save(id, &doc)?;
        Ok(Some(doc.modified_at))
    }

    fn build_document(&self, active: &ActiveDocument, modified_at: Timestamp) -> Document {
        Document {
            content: active.content.clone(),
            title: active.resolved_title(),
            subtitle: active.subtitle.clone(),
            created_at: active.created_at.clone(),
            modified_at,
            tags: active.tags.clone(),
            status: active.status,
            extra: active.extra.clone(),
        }
    }

    fn perform_save(&mut self, id: &str) -> bool {
        let Some(active) = self.active.as_ref().filter(|active| active.id == id) else {
            debug!("event=autosave module=manager status=skip reason=inactive id={id}");
            return false;
        };

        let modified_at = active.modified_at.advanced_to(self.clock.now());
        let doc = self.build_document(active, modified_at.clone());
        if let Err(err) = self.store.save(id, &doc) {
            warn!("event=autosave module=manager status=error id={id} error={err}");
            return false;
        }

        if let Some(active) = self.active.as_mut() {
            active.modified_at = modified_at;
        }
        self.last_viewed.set(id);
        self.save_status = SaveStatus::Saved;

        let summary = doc.summary(id);
        match self.documents.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = summary,
            None => self.documents.insert(0, summary),
        }
        debug!("event=autosave module=manager status=ok id={id}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{ActiveDocument, SaveStatus};
    use crate::model::node::Node;
    use chrono::{TimeZone, Utc};

    #[test]
    fn resolved_title_prefers_explicit_then_extracted() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut active = ActiveDocument::fresh("a".to_string(), now);
        assert_eq!(active.resolved_title(), "Untitled");

        active.content = Node::doc(vec![Node::paragraph(vec![Node::text("First line")])]);
        assert_eq!(active.resolved_title(), "First line");

        active.content = Node::doc(vec![Node::heading(1, vec![])]);
        assert_eq!(active.resolved_title(), "Untitled");

        active.title = "Explicit".to_string();
        assert_eq!(active.resolved_title(), "Explicit");
    }

    #[test]
    fn save_status_labels() {
        assert_eq!(SaveStatus::Saved.as_str(), "saved");
        assert_eq!(SaveStatus::Unsaved.as_str(), "unsaved");
    }
}
