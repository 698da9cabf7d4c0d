//! Tag filter, title search and recency ordering over sidebar summaries.
//!
//! # Invariants
//! - Every stage is pure and keeps the relative order of retained items.
//! - Blank queries and empty tag filters are identities.
//! - Title search is a literal substring match; query text is never
//!   interpreted as a pattern.

use crate::model::document::SidebarSummary;
use std::collections::BTreeSet;

/// Keeps summaries carrying `tag`; `None` or `""` keeps everything.
pub fn filter_by_tag(docs: &[SidebarSummary], tag: Option<&str>) -> Vec<SidebarSummary> {
    match tag {
        Some(tag) if !tag.is_empty() => docs
            .iter()
            .filter(|doc| doc.tags.iter().any(|candidate| candidate == tag))
            .cloned()
            .collect(),
        _ => docs.to_vec(),
    }
}

/// Case-insensitive substring match on titles; blank query keeps everything.
pub fn search_by_title(docs: &[SidebarSummary], query: &str) -> Vec<SidebarSummary> {
    if query.trim().is_empty() {
        return docs.to_vec();
    }
    let needle = query.to_lowercase();
    docs.iter()
        .filter(|doc| doc.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Newest first; ties keep their input order.
pub fn sort_by_modified(docs: &[SidebarSummary]) -> Vec<SidebarSummary> {
    let mut sorted = docs.to_vec();
    sorted.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    sorted
}

/// Union of all tags, deduplicated and sorted.
pub fn collect_tags(docs: &[SidebarSummary]) -> Vec<String> {
    docs.iter()
        .flat_map(|doc| doc.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sidebar query: active tag filter plus search text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarQuery {
    pub tag: Option<String>,
    pub text: String,
}

impl SidebarQuery {
    pub fn new(tag: Option<String>, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }

    /// Runs tag filter, then title search, then recency sort.
    pub fn apply(&self, docs: &[SidebarSummary]) -> Vec<SidebarSummary> {
        let tagged = filter_by_tag(docs, self.tag.as_deref());
        let matched = search_by_title(&tagged, &self.text);
        sort_by_modified(&matched)
    }
}
