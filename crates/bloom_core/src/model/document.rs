//! Document record and sidebar projection.
//!
//! # Responsibility
//! - Define the persisted writing unit (content tree plus metadata).
//! - Define the lightweight summary used for listing.
//! - Own tag normalization and timestamp encoding rules.
//!
//! # Invariants
//! - `content` is always a `doc` root.
//! - `tags` never contains duplicates or blank values.
//! - New timestamps are UTC, truncated to milliseconds, and encode as
//!   RFC 3339 with millisecond precision.
//! - Stored timestamp text is kept verbatim until the manager restamps it.
//! - `extra` never contains a known top-level key.

use crate::model::node::Node;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Storage key of a document; also the file stem of its `.bloom` file.
pub type DocumentId = String;

/// Display title used whenever no better title is known.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Publication state of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentStatus {
    #[default]
    Draft,
    Published,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    /// Anything other than the literal `"published"` is a draft.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(status)) if status == "published" => Self::Published,
            _ => Self::Draft,
        }
    }
}

/// Persisted timestamp: the stored text plus the instant it denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    text: String,
}

impl Timestamp {
    /// Stamps `value`, truncated to the millisecond precision it encodes with.
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        let instant = value.trunc_subsecs(3);
        Self {
            text: format_timestamp(instant),
            instant,
        }
    }

    /// Keeps `text` as stored; `fallback` stands in when it does not parse.
    pub fn from_text(text: impl Into<String>, fallback: DateTime<Utc>) -> Self {
        let text = text.into();
        Self {
            instant: parse_timestamp(&text).unwrap_or(fallback),
            text,
        }
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Stamp for a save at `now` that never moves behind `self`.
    pub fn advanced_to(&self, now: DateTime<Utc>) -> Self {
        Self::from_datetime(self.instant.max(now))
    }
}

/// Full persisted document.
///
/// The id is not part of the record; it is the storage key the record is
/// saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: Node,
    pub title: String,
    pub subtitle: String,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub tags: Vec<String>,
    pub status: DocumentStatus,
    /// Top-level fields written by other builds, preserved verbatim.
    pub extra: Map<String, Value>,
}

impl Document {
    /// Creates an empty draft stamped with `now`.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            content: Node::empty_doc(),
            title: DEFAULT_TITLE.to_string(),
            subtitle: String::new(),
            created_at: Timestamp::from_datetime(now),
            modified_at: Timestamp::from_datetime(now),
            tags: Vec::new(),
            status: DocumentStatus::Draft,
            extra: Map::new(),
        }
    }

    /// Replaces the tag set, normalizing it.
    pub fn set_tags<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = normalize_tags(tags);
    }

    pub fn summary(&self, id: impl Into<DocumentId>) -> SidebarSummary {
        SidebarSummary {
            id: id.into(),
            title: if self.title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                self.title.clone()
            },
            modified_at: self.modified_at.instant(),
            tags: self.tags.clone(),
        }
    }
}

/// Listing projection of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarSummary {
    pub id: DocumentId,
    pub title: String,
    pub modified_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl SidebarSummary {
    /// Stand-in row for a document that could not be loaded.
    pub fn placeholder(id: impl Into<DocumentId>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            modified_at: now,
            tags: Vec::new(),
        }
    }
}

/// Generates a fresh document id.
pub fn new_document_id() -> DocumentId {
    Uuid::new_v4().to_string()
}

/// Trims tags, drops blank values and removes duplicates.
///
/// First occurrence wins; tag order carries no meaning.
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() || unique.iter().any(|known| known == trimmed) {
            continue;
        }
        unique.push(trimmed.to_string());
    }
    unique
}

/// Encodes a timestamp as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339, a zoneless date-time (read as UTC) and a bare date
/// (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::{
        format_timestamp, normalize_tags, parse_timestamp, Document, DocumentStatus, Timestamp,
    };
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn normalize_tags_dedupes_and_drops_blank() {
        let tags = normalize_tags(["rust", " rust ", "", "   ", "notes", "Rust"]);
        assert_eq!(tags, vec!["rust", "notes", "Rust"]);
    }

    #[test]
    fn timestamps_use_millisecond_zulu_format() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(at), "2026-01-01T00:00:00.000Z");
        assert_eq!(parse_timestamp("2026-01-01T00:00:00.000Z"), Some(at));
        assert_eq!(parse_timestamp("2026-01-01T02:00:00+02:00"), Some(at));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn parses_date_only_and_zoneless_values_as_utc() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01"), Some(midnight));
        assert_eq!(
            parse_timestamp("2024-01-01T08:30:00"),
            Some(midnight + Duration::minutes(510))
        );
    }

    #[test]
    fn new_stamps_truncate_to_milliseconds() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let stamp = Timestamp::from_datetime(base + Duration::nanoseconds(937_513_981));
        assert_eq!(stamp.as_str(), "2026-01-01T00:00:00.937Z");
        assert_eq!(stamp.instant(), base + Duration::milliseconds(937));
        assert_eq!(Timestamp::from_text(stamp.as_str(), base), stamp);
    }

    #[test]
    fn stored_text_is_kept_verbatim() {
        let fallback = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let precise = Timestamp::from_text("2024-01-01T00:00:00.123456Z", fallback);
        assert_eq!(precise.as_str(), "2024-01-01T00:00:00.123456Z");
        assert_eq!(
            precise.instant(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::microseconds(123_456)
        );

        let unreadable = Timestamp::from_text("last tuesday", fallback);
        assert_eq!(unreadable.as_str(), "last tuesday");
        assert_eq!(unreadable.instant(), fallback);
    }

    #[test]
    fn advanced_stamp_never_moves_back() {
        let later = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let stamp = Timestamp::from_datetime(later);
        assert_eq!(stamp.advanced_to(earlier).instant(), later);
        assert_eq!(
            stamp.advanced_to(later + Duration::seconds(1)).instant(),
            later + Duration::seconds(1)
        );
    }

    #[test]
    fn only_literal_published_is_published() {
        assert_eq!(
            DocumentStatus::from_value(Some(&json!("published"))),
            DocumentStatus::Published
        );
        assert_eq!(
            DocumentStatus::from_value(Some(&json!("Published"))),
            DocumentStatus::Draft
        );
        assert_eq!(DocumentStatus::from_value(None), DocumentStatus::Draft);
    }

    #[test]
    fn summary_shows_default_title_for_blank_title() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let mut doc = Document::empty(now);
        doc.title.clear();
        doc.set_tags(["a", "a", "b"]);
        let summary = doc.summary("doc-1");
        assert_eq!(summary.title, "Untitled");
        assert_eq!(summary.tags, vec!["a", "b"]);
        assert_eq!(summary.modified_at, now);
    }
}
